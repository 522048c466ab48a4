//! Substrate call and event filters.

use serde::{Deserialize, Serialize};

use blockmap_core::filter::{lenient, spec_version_matches, BlockContext, RecordFilter};
use blockmap_core::SpecVersionRange;

use crate::types::{SubstrateEvent, SubstrateExtrinsic};

/// Event filter: spec version range plus module / method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubqlEventFilter {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<SpecVersionRange>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl SubqlEventFilter {
    /// Events of `module.method`.
    pub fn new(module: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            method: Some(method.into()),
            ..Default::default()
        }
    }

    pub fn spec_version(mut self, range: SpecVersionRange) -> Self {
        self.spec_version = Some(range);
        self
    }
}

impl RecordFilter<SubstrateEvent> for SubqlEventFilter {
    fn matches(&self, event: &SubstrateEvent, block: &BlockContext<'_>) -> bool {
        spec_version_matches(self.spec_version.as_ref(), block.spec_version)
            && eq_if_set(self.module.as_deref(), Some(event.module.as_str()))
            && eq_if_set(self.method.as_deref(), Some(event.method.as_str()))
    }
}

/// Call filter: the event filter fields plus success / from / to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubqlCallFilter {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<SpecVersionRange>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Signer account.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Destination account.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl SubqlCallFilter {
    /// Calls of `module.method`.
    pub fn new(module: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            method: Some(method.into()),
            ..Default::default()
        }
    }

    pub fn spec_version(mut self, range: SpecVersionRange) -> Self {
        self.spec_version = Some(range);
        self
    }

    pub fn success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    /// Only calls signed by `signer`.
    pub fn signer(mut self, signer: impl Into<String>) -> Self {
        self.from = Some(signer.into());
        self
    }

    /// Only calls whose destination is `dest`.
    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.to = Some(dest.into());
        self
    }
}

impl RecordFilter<SubstrateExtrinsic> for SubqlCallFilter {
    fn matches(&self, call: &SubstrateExtrinsic, block: &BlockContext<'_>) -> bool {
        spec_version_matches(self.spec_version.as_ref(), block.spec_version)
            && eq_if_set(self.module.as_deref(), Some(call.module.as_str()))
            && eq_if_set(self.method.as_deref(), Some(call.method.as_str()))
            && self.success.map_or(true, |s| s == call.success)
            && eq_if_set(self.from.as_deref(), call.signer.as_deref())
            && eq_if_set(self.to.as_deref(), call.dest.as_deref())
    }
}

/// Unset filter field = wildcard; a set field requires the record to have an
/// equal value.
fn eq_if_set(want: Option<&str>, have: Option<&str>) -> bool {
    match want {
        None => true,
        Some(want) => have == Some(want),
    }
}
