use super::*;
use crate::session::test_support::{InstantTimer, StallingTimer};
use futures::executor::block_on;

#[test]
fn race_first_ready_wins() {
    let outcome = block_on(race(async { 1 }, futures::future::pending::<&str>()));
    assert_eq!(outcome, Race::First(1));
}

#[test]
fn race_second_wins_when_first_is_pending() {
    let outcome = block_on(race(futures::future::pending::<u8>(), async { "late" }));
    assert_eq!(outcome, Race::Second("late"));
}

#[test]
fn race_tie_goes_to_first() {
    let outcome = block_on(race(async { 'a' }, async { 'b' }));
    assert_eq!(outcome, Race::First('a'));
}

#[test]
fn race_drops_the_loser() {
    struct DropFlag<'a>(&'a std::cell::Cell<bool>);
    impl Drop for DropFlag<'_> {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    let dropped = std::cell::Cell::new(false);
    let loser = async {
        let _flag = DropFlag(&dropped);
        futures::future::pending::<()>().await;
    };
    let outcome = block_on(race(async { 7 }, loser));
    assert_eq!(outcome, Race::First(7));
    assert!(!dropped.get(), "loser never started, so no flag was created");

    let dropped = std::cell::Cell::new(false);
    let started_loser = async {
        let _flag = DropFlag(&dropped);
        futures::future::pending::<()>().await;
    };
    let timer = StallingTimer { threshold: Duration::from_secs(1) };
    let outcome = block_on(race(started_loser, timer.sleep(Duration::from_secs(5))));
    assert_eq!(outcome, Race::Second(()));
    assert!(dropped.get());
}

#[test]
fn with_timeout_returns_output_when_work_finishes() {
    let timer = InstantTimer::default();
    let result = block_on(with_timeout(&timer, Duration::from_secs(10), async { "done" }));
    assert_eq!(result, Some("done"));
    assert_eq!(*timer.sleeps.borrow(), vec![Duration::from_secs(10)]);
}

#[test]
fn with_timeout_returns_none_when_work_stalls() {
    let timer = InstantTimer::default();
    let result = block_on(with_timeout(&timer, Duration::from_secs(10), futures::future::pending::<()>()));
    assert_eq!(result, None);
}

#[test]
fn browser_timer_is_immediate_natively() {
    block_on(BrowserTimer.sleep(Duration::from_secs(60)));
}
