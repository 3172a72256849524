//! Delete Builder

use super::build_dml_limit;
use crate::dialect::DialectPolicy;
use crate::query::LimitOffset;

#[derive(Debug, Clone, Copy)]
pub struct DeleteBuilder {
    policy: &'static DialectPolicy,
}

impl DeleteBuilder {
    pub fn new(policy: &'static DialectPolicy) -> Self {
        Self { policy }
    }

    pub fn build_from(&self, from: &str) -> String {
        format!(" FROM {}", from)
    }

    pub fn build_limit(&self, state: &LimitOffset) -> String {
        build_dml_limit(self.policy.delete_limit, state)
    }
}
