use super::{
    DefinitionSet,
    MetricDefinition,
    TimerDefinition,
};
use crate::metrics::StatOperation;

const GAUGES: &[MetricDefinition] = &[
    MetricDefinition::gauge("consul.runtime.num_goroutines", "runtime.goroutines"),
    MetricDefinition::gauge("consul.runtime.alloc_bytes", "runtime.allocationsInBytes"),
    MetricDefinition::gauge("consul.runtime.heap_objects", "runtime.heapObjects"),
    MetricDefinition::gauge("consul.runtime.sys_bytes", "runtime.virtualAddressSpaceInBytes"),
    MetricDefinition::gauge("consul.runtime.malloc_count", "runtime.allocations"),
    MetricDefinition::gauge("consul.runtime.free_count", "runtime.frees"),
    MetricDefinition::gauge(super::GC_PAUSE_API_KEY, "runtime.gcPauseInMilliseconds"),
    MetricDefinition::gauge("consul.runtime.total_gc_runs", "runtime.gcCycles"),
];

const COUNTERS: &[MetricDefinition] = &[
    MetricDefinition::rate("consul.client.rpc", "client.rpcLoad"),
    MetricDefinition::rate("consul.client.rpc.exceeded", "client.rpcRateLimited"),
    MetricDefinition::rate("consul.client.rpc.failed", "client.rpcFailed"),
    MetricDefinition::rate("consul.acl.cache_hit", "agent.aclCacheHit"),
    MetricDefinition::rate("consul.acl.cache_miss", "agent.aclCacheMiss"),
    MetricDefinition::rate("consul.dns.stale_queries", "agent.staleQueries"),
];

const TIMERS: &[TimerDefinition] = &[
    TimerDefinition::new(
        MetricDefinition::gauge("consul.txn.apply", "agent.txnAvgInMilliseconds"),
        StatOperation::Average,
    ),
    TimerDefinition::new(MetricDefinition::rate("consul.txn.apply", "agent.txns"), StatOperation::Count),
    TimerDefinition::new(MetricDefinition::gauge("consul.txn.apply", "agent.txnMaxInMilliseconds"), StatOperation::Max),
];

/// Metrics read from every agent's own telemetry.
pub const AGENT_DEFINITIONS: DefinitionSet = DefinitionSet {
    gauges: GAUGES,
    counters: COUNTERS,
    timers: TIMERS,
};
