use super::*;

#[test]
fn titles_follow_kind() {
    assert_eq!(NotificationKind::Success.title(), "Success");
    assert_eq!(NotificationKind::Error.title(), "Error");
    assert_eq!(NotificationKind::Info.title(), "Notification");
}

#[test]
fn only_errors_offer_retry() {
    let mut notifier = Notifier::default();
    notifier.success("ok");
    notifier.info("fyi");
    notifier.error("boom");

    let drained = notifier.drain();
    let actions: Vec<_> = drained.iter().map(|n| n.action).collect();
    assert_eq!(actions, [None, None, Some(NotifyAction::Retry)]);
    assert_eq!(NotifyAction::Retry.label(), "Try again");
}

#[test]
fn drain_returns_oldest_first_and_empties() {
    let mut notifier = Notifier::default();
    let first = notifier.info("one");
    notifier.info("two");

    let drained = notifier.drain();
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].id, first);
    assert_eq!(drained[1].message, "two");
    assert!(notifier.is_empty());
    assert!(notifier.last().is_none());
}

#[test]
fn ids_are_unique() {
    let mut notifier = Notifier::default();
    let a = notifier.info("same");
    let b = notifier.info("same");
    assert_ne!(a, b);
}

#[test]
fn full_queue_drops_oldest() {
    let mut notifier = Notifier::with_capacity(2);
    notifier.info("one");
    notifier.info("two");
    notifier.error("three");

    assert_eq!(notifier.len(), 2);
    assert_eq!(notifier.last().map(Notification::title), Some("Error"));
    let messages: Vec<String> = notifier.drain().into_iter().map(|n| n.message).collect();
    assert_eq!(messages, ["two", "three"]);
}

#[test]
fn zero_capacity_still_holds_one() {
    let mut notifier = Notifier::with_capacity(0);
    notifier.info("a");
    notifier.info("b");
    assert_eq!(notifier.len(), 1);
    assert_eq!(notifier.last().map(|n| n.message.as_str()), Some("b"));
}
