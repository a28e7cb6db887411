//! Tests for audit sink

use prometheus_work_queue::core::{
    build_audit_event, AuditAction, AuditSink, InMemoryAuditSink, TracingAuditSink,
};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    sink.record(build_audit_event(Some(0), "pool1", AuditAction::Submitted));
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].seq, Some(0));
    assert_eq!(events[0].scheduler, "pool1");
    assert_eq!(events[0].action, AuditAction::Submitted);
    assert!(events[0].created_at_ms > 0);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event(Some(1), "pool1", AuditAction::Submitted));
    sink.record(build_audit_event(Some(2), "pool1", AuditAction::Submitted));
    sink.record(build_audit_event(Some(3), "pool1", AuditAction::Submitted));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].seq, Some(2));
    assert_eq!(events[1].seq, Some(3));
}

#[test]
fn test_audit_sink_clones_share_buffer() {
    let sink = InMemoryAuditSink::new(10);
    let mut writer = sink.clone();

    writer.record(build_audit_event(Some(0), "q", AuditAction::Admitted { active: 1 }));
    writer.record(build_audit_event(Some(1), "q", AuditAction::Admitted { active: 2 }));
    writer.record(build_audit_event(Some(0), "q", AuditAction::Settled { ok: true }));
    writer.record(build_audit_event(Some(1), "q", AuditAction::Settled { ok: false }));
    writer.record(build_audit_event(None, "q", AuditAction::Drained));

    assert_eq!(sink.admission_order(), vec![0, 1]);
    assert_eq!(sink.peak_active(), 2);
    assert_eq!(sink.count(|a| matches!(a, AuditAction::Settled { .. })), 2);
    assert_eq!(sink.count(|a| *a == AuditAction::Drained), 1);
}

#[test]
fn test_zero_capacity_sink_keeps_nothing() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event(None, "q", AuditAction::Drained));
    assert!(sink.events().is_empty());
}

#[test]
fn test_audit_action_display() {
    assert_eq!(AuditAction::Submitted.to_string(), "submit");
    assert_eq!(AuditAction::Admitted { active: 3 }.to_string(), "admit(active=3)");
    assert_eq!(AuditAction::Settled { ok: true }.to_string(), "settle(ok)");
    assert_eq!(AuditAction::Settled { ok: false }.to_string(), "settle(err)");
    assert_eq!(AuditAction::Drained.to_string(), "drain");
}

#[test]
fn test_tracing_sink_accepts_events() {
    let mut sink = TracingAuditSink;
    sink.record(build_audit_event(Some(9), "q", AuditAction::Submitted));
}
