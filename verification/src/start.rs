//! Quick-start: begin a hosted verification without the full form.
//!
//! Tries the form-encoded start endpoint first and falls back to the older
//! JSON endpoint only when that call fails.

use idgate_client::{LegacyStartRequest, StartRequest, VerifyGateway};
use idgate_types::{CustomerContext, CustomerType, UiEffect, VerifyView};

/// Caller-supplied overrides. Anything unset comes from the customer context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StartParams {
    pub customer_gid: Option<String>,
    pub customer_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub mode: Option<String>,
    pub return_to: Option<String>,
    pub nzbn: Option<String>,
    pub business_name: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartRoute {
    Primary,
    Legacy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Redirecting { url: String, route: StartRoute },
    /// The primary endpoint succeeded without a redirect target.
    NoRedirect,
    /// No customer reference; nothing was sent.
    MissingCustomer,
    /// Both endpoints failed. Logged only.
    Failed,
}

/// Start a hosted verification.
///
/// `fallback_return` is used when `params.return_to` is unset. The only
/// visible effect is a navigation on success.
pub async fn start_verification(
    gateway: &dyn VerifyGateway,
    view: &dyn VerifyView,
    customer: &CustomerContext,
    params: StartParams,
    fallback_return: &str,
) -> StartOutcome {
    let customer_gid = params
        .customer_gid
        .clone()
        .filter(|g| !g.trim().is_empty())
        .or_else(|| customer.global_ref().map(|g| g.to_string()));
    let Some(customer_gid) = customer_gid else {
        tracing::warn!("quick-start aborted: missing customer context");
        return StartOutcome::MissingCustomer;
    };

    let return_to = params
        .return_to
        .clone()
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| fallback_return.to_string());
    let request = StartRequest {
        customer_gid,
        mode: params
            .mode
            .as_deref()
            .unwrap_or(CustomerType::Individual.as_str())
            .to_lowercase(),
        return_to: return_to.clone(),
        nzbn: non_empty(&params.nzbn),
        business_name: non_empty(&params.business_name),
    };

    let primary_error = match gateway.start(&request).await {
        Ok(response) => {
            return match response.redirect_target() {
                Some(url) => navigate(view, url, StartRoute::Primary),
                None => {
                    tracing::debug!("start endpoint returned no redirect");
                    StartOutcome::NoRedirect
                }
            };
        }
        Err(err) => err,
    };
    tracing::debug!(
        error = %primary_error,
        transport = primary_error.is_transport(),
        "start endpoint failed; trying legacy endpoint"
    );

    let legacy = LegacyStartRequest {
        customer_id: params.customer_id.or_else(|| customer.id.clone()),
        email: params.email.or_else(|| customer.email.clone()),
        name: params.name.or_else(|| customer.name.clone()),
        mode: params
            .mode
            .unwrap_or_else(|| CustomerType::Individual.as_str().to_string()),
        nzbn: non_empty(&params.nzbn),
        business_name: non_empty(&params.business_name),
        return_to,
    };

    match gateway.start_legacy(&legacy).await {
        Ok(response) => match response.redirect_target() {
            Some(url) => navigate(view, url, StartRoute::Legacy),
            None => {
                tracing::warn!(primary = %primary_error, "legacy start returned no redirect URL");
                StartOutcome::Failed
            }
        },
        Err(err) => {
            tracing::warn!(primary = %primary_error, legacy = %err, "verification start failed");
            StartOutcome::Failed
        }
    }
}

fn navigate(view: &dyn VerifyView, url: &str, route: StartRoute) -> StartOutcome {
    tracing::info!(?route, "redirecting to hosted verification");
    view.apply(UiEffect::Navigate {
        url: url.to_string(),
    });
    StartOutcome::Redirecting {
        url: url.to_string(),
        route,
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idgate_client::StartResponse;
    use idgate_nullables::{GatewayCall, NullGateway, NullReply, RecordingView};

    const FALLBACK: &str = "https://shop.test/pages/verify";

    fn customer() -> CustomerContext {
        CustomerContext {
            id: Some("42".into()),
            email: Some("kim@example.com".into()),
            name: Some("Kim".into()),
            ..CustomerContext::default()
        }
    }

    #[tokio::test]
    async fn primary_redirect_skips_legacy() {
        let gateway = NullGateway::new();
        gateway.reply_start(NullReply::Ok(StartResponse::redirect("https://idv.test/s")));
        let view = RecordingView::new();

        let params = StartParams {
            mode: Some("Business".into()),
            nzbn: Some(" 9429041234567 ".into()),
            ..StartParams::default()
        };
        let outcome = start_verification(&gateway, &view, &customer(), params, FALLBACK).await;

        assert_eq!(
            outcome,
            StartOutcome::Redirecting {
                url: "https://idv.test/s".into(),
                route: StartRoute::Primary
            }
        );
        assert_eq!(gateway.legacy_calls(), 0);
        match &gateway.calls()[0] {
            GatewayCall::Start(request) => {
                assert_eq!(request.customer_gid, "gid://shopify/Customer/42");
                assert_eq!(request.mode, "business");
                assert_eq!(request.return_to, FALLBACK);
                assert_eq!(request.nzbn.as_deref(), Some("9429041234567"));
                assert_eq!(request.business_name, None);
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert!(view.contains(&UiEffect::Navigate {
            url: "https://idv.test/s".into()
        }));
    }

    #[tokio::test]
    async fn primary_without_redirect_does_nothing() {
        let gateway = NullGateway::new();
        gateway.reply_start(NullReply::Ok(StartResponse::default()));
        let view = RecordingView::new();

        let outcome =
            start_verification(&gateway, &view, &customer(), StartParams::default(), FALLBACK).await;
        assert_eq!(outcome, StartOutcome::NoRedirect);
        assert_eq!(gateway.legacy_calls(), 0);
        assert!(view.effects().is_empty());
    }

    #[tokio::test]
    async fn legacy_only_after_primary_fails() {
        let gateway = NullGateway::new();
        gateway
            .reply_start(NullReply::Status(500))
            .reply_legacy(NullReply::Ok(StartResponse {
                url: Some("https://idv.test/legacy".into()),
                ..StartResponse::default()
            }));
        let view = RecordingView::new();

        let params = StartParams {
            return_to: Some("https://shop.test/cart".into()),
            ..StartParams::default()
        };
        let outcome = start_verification(&gateway, &view, &customer(), params, FALLBACK).await;

        assert_eq!(
            outcome,
            StartOutcome::Redirecting {
                url: "https://idv.test/legacy".into(),
                route: StartRoute::Legacy
            }
        );
        let calls = gateway.calls();
        assert!(matches!(calls[0], GatewayCall::Start(_)));
        match &calls[1] {
            GatewayCall::StartLegacy(request) => {
                assert_eq!(request.customer_id.as_deref(), Some("42"));
                assert_eq!(request.email.as_deref(), Some("kim@example.com"));
                assert_eq!(request.mode, "individual");
                assert_eq!(request.return_to, "https://shop.test/cart");
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_primary_body_falls_back() {
        let gateway = NullGateway::new();
        gateway
            .reply_start(NullReply::Malformed)
            .reply_legacy(NullReply::Ok(StartResponse::redirect("https://idv.test/l")));
        let view = RecordingView::new();

        let outcome =
            start_verification(&gateway, &view, &customer(), StartParams::default(), FALLBACK).await;
        assert!(matches!(
            outcome,
            StartOutcome::Redirecting {
                route: StartRoute::Legacy,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn both_failing_is_logged_only() {
        let gateway = NullGateway::new();
        let view = RecordingView::new();

        let outcome =
            start_verification(&gateway, &view, &customer(), StartParams::default(), FALLBACK).await;
        assert_eq!(outcome, StartOutcome::Failed);
        assert_eq!(gateway.start_calls(), 1);
        assert_eq!(gateway.legacy_calls(), 1);
        assert!(view.effects().is_empty());
    }

    #[tokio::test]
    async fn missing_customer_sends_nothing() {
        let gateway = NullGateway::new();
        let view = RecordingView::new();

        let outcome = start_verification(
            &gateway,
            &view,
            &CustomerContext::default(),
            StartParams::default(),
            FALLBACK,
        )
        .await;
        assert_eq!(outcome, StartOutcome::MissingCustomer);
        assert!(gateway.calls().is_empty());
        assert!(view.effects().is_empty());
    }

    #[tokio::test]
    async fn explicit_gid_wins_over_context() {
        let gateway = NullGateway::new();
        gateway.reply_start(NullReply::Ok(StartResponse::default()));
        let view = RecordingView::new();

        let params = StartParams {
            customer_gid: Some("gid://shopify/Customer/7".into()),
            ..StartParams::default()
        };
        start_verification(&gateway, &view, &CustomerContext::default(), params, FALLBACK).await;
        assert!(matches!(
            &gateway.calls()[0],
            GatewayCall::Start(r) if r.customer_gid == "gid://shopify/Customer/7"
        ));
    }
}
