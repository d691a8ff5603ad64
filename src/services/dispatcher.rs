//! Routes bibliography entries to the publisher adapter of their conference.

use std::sync::Arc;

use reqwest::Client;

use super::publishers::{CcsAdapter, IeeeAdapter, NdssAdapter, PublisherAdapter, UsenixAdapter};
use crate::models::{BibEntry, Conference};
use crate::utils::render::PageRenderer;

/// One adapter per conference.
pub struct AbstractDispatcher {
    ndss: Box<dyn PublisherAdapter>,
    sp: Box<dyn PublisherAdapter>,
    usenix: Box<dyn PublisherAdapter>,
    ccs: Box<dyn PublisherAdapter>,
}

impl AbstractDispatcher {
    /// Build the standard adapters sharing one HTTP client.
    pub fn new(client: Client, renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            ndss: Box::new(NdssAdapter::new(client.clone())),
            sp: Box::new(IeeeAdapter::new(renderer)),
            usenix: Box::new(UsenixAdapter::new(client.clone())),
            ccs: Box::new(CcsAdapter::new(client)),
        }
    }

    /// Build a dispatcher from explicit adapters.
    pub fn with_adapters(
        ndss: Box<dyn PublisherAdapter>,
        sp: Box<dyn PublisherAdapter>,
        usenix: Box<dyn PublisherAdapter>,
        ccs: Box<dyn PublisherAdapter>,
    ) -> Self {
        Self {
            ndss,
            sp,
            usenix,
            ccs,
        }
    }

    /// Adapter responsible for `conference`.
    pub fn adapter(&self, conference: Conference) -> &dyn PublisherAdapter {
        match conference {
            Conference::Ndss => self.ndss.as_ref(),
            Conference::SecurityPrivacy => self.sp.as_ref(),
            Conference::Usenix => self.usenix.as_ref(),
            Conference::Ccs => self.ccs.as_ref(),
        }
    }

    /// Best-effort abstract for `entry`; empty when extraction fails.
    pub async fn get_abstract(&self, conference: Conference, entry: &BibEntry) -> String {
        self.adapter(conference).extract_abstract(entry).await
    }
}
