use super::{
    DefinitionSet,
    MetricDefinition,
    TimerDefinition,
};
use crate::metrics::StatOperation;

const COUNTERS: &[MetricDefinition] = &[
    MetricDefinition::rate("consul.memberlist.msg.suspect", "cluster.suspects"),
    MetricDefinition::rate("consul.serf.member.flap", "cluster.flaps"),
    MetricDefinition::rate("consul.raft.state.leader", "raft.completedLeaderElections"),
    MetricDefinition::rate("consul.raft.state.candidate", "raft.initiatedLeaderElections"),
    MetricDefinition::rate("consul.raft.apply", "raft.txns"),
];

const TIMERS: &[TimerDefinition] = &[
    TimerDefinition::new(
        MetricDefinition::gauge("consul.raft.commitTime", "raft.commitTimeAvgInMilliseconds"),
        StatOperation::Average,
    ),
    TimerDefinition::new(MetricDefinition::rate("consul.raft.commitTime", "raft.commitTimes"), StatOperation::Count),
    TimerDefinition::new(
        MetricDefinition::gauge("consul.raft.commitTime", "raft.commitTimeMedianInMilliseconds"),
        StatOperation::Median,
    ),
    TimerDefinition::new(
        MetricDefinition::gauge("consul.raft.commitTime", "raft.commitTimeMaxInMilliseconds"),
        StatOperation::Max,
    ),
    TimerDefinition::new(
        MetricDefinition::gauge("consul.raft.leader.dispatchLog", "raft.logDispatchAvgInMilliseconds"),
        StatOperation::Average,
    ),
    TimerDefinition::new(
        MetricDefinition::rate("consul.raft.leader.dispatchLog", "raft.logDispatches"),
        StatOperation::Count,
    ),
    TimerDefinition::new(
        MetricDefinition::gauge("consul.raft.leader.dispatchLog", "raft.logDispatchMedianInMilliseconds"),
        StatOperation::Median,
    ),
    TimerDefinition::new(
        MetricDefinition::gauge("consul.raft.leader.dispatchLog", "raft.logDispatchMaxInMilliseconds"),
        StatOperation::Max,
    ),
    TimerDefinition::new(
        MetricDefinition::gauge("consul.raft.leader.lastContact", "raft.lastContactAvgInMilliseconds"),
        StatOperation::Average,
    ),
    TimerDefinition::new(
        MetricDefinition::rate("consul.raft.leader.lastContact", "raft.lastContacts"),
        StatOperation::Count,
    ),
    TimerDefinition::new(
        MetricDefinition::gauge("consul.raft.leader.lastContact", "raft.lastContactMedianInMilliseconds"),
        StatOperation::Median,
    ),
    TimerDefinition::new(
        MetricDefinition::gauge("consul.raft.leader.lastContact", "raft.lastContactMaxInMilliseconds"),
        StatOperation::Max,
    ),
];

/// Cluster-wide metrics, read from the leader's telemetry.
pub const DATACENTER_DEFINITIONS: DefinitionSet = DefinitionSet {
    gauges: &[],
    counters: COUNTERS,
    timers: TIMERS,
};
