//! Collaborators shared by everything on one verification page.

use std::sync::Arc;

use idgate_client::VerifyGateway;
use idgate_types::{Clock, CustomerContext, PageLocation, Prefill, SystemClock, VerifyView};

use crate::cache::StateCache;
use crate::config::IdgateConfig;

/// Page-scoped services: the remote gateway, the state cache, the page-level
/// view, and the host-supplied context.
pub struct PageServices {
    pub gateway: Arc<dyn VerifyGateway>,
    pub cache: StateCache,
    /// Page-level surface: processing message and status panels.
    pub view: Arc<dyn VerifyView>,
    pub clock: Arc<dyn Clock>,
    pub customer: CustomerContext,
    pub prefill: Option<Prefill>,
    pub location: PageLocation,
    pub config: IdgateConfig,
}

impl PageServices {
    pub fn new(
        gateway: Arc<dyn VerifyGateway>,
        view: Arc<dyn VerifyView>,
        customer: CustomerContext,
        location: PageLocation,
        config: IdgateConfig,
    ) -> Self {
        Self {
            cache: StateCache::new(Arc::clone(&gateway)),
            gateway,
            view,
            clock: Arc::new(SystemClock),
            customer,
            prefill: None,
            location,
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_prefill(mut self, prefill: Prefill) -> Self {
        self.prefill = Some(prefill);
        self
    }

    /// Where a quick-start returns to when the control has no explicit target.
    pub fn default_return_target(&self) -> String {
        self.location
            .referrer()
            .unwrap_or_else(|| self.location.href())
            .to_string()
    }
}
