//! Metric definitions emitted by the rewrite middleware.

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub description: &'static str,
}

pub const REDIRECTS_ISSUED: MetricDef = MetricDef {
    name: "rewrite.redirects.issued",
    description: "Requests that matched a rewrite rule and were redirected",
};

pub const REQUESTS_PASSED: MetricDef = MetricDef {
    name: "rewrite.requests.passed",
    description: "Requests passed to the next handler (filter skip or no rule matched)",
};

pub const ALL_METRICS: &[MetricDef] = &[REDIRECTS_ISSUED, REQUESTS_PASSED];
