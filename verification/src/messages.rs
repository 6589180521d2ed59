//! User-facing copy.

pub const INCOMPLETE_FORM: &str = "Complete ALL required fields To continue";
pub const MISSING_DETAILS: &str = "Missing verification details.";
pub const UNABLE_TO_START: &str = "Unable to start identity check.";
pub const MISSING_REDIRECT: &str = "Missing redirect URL from identity session.";
pub const START_UNAVAILABLE: &str =
    "We could not start your verification right now. Please try again or contact support.";

pub const PROCESSING: &str =
    "Thanks, your verification is being finalised. This usually takes less than a minute.";
pub const VERIFIED: &str = "You're verified! You can now purchase restricted products.";
pub const VERIFY_FAILED: &str = "We couldn't verify your ID. Please try again or contact support.";
pub const STILL_PROCESSING: &str =
    "Your verification is still processing. This can take a little longer sometimes.";
