use std::time::Duration;

use folio_contact::{Controller, Entry, Outcome, Status, Step, Variant};
use tokio::time::{sleep, timeout};

mod helpers;

use helpers::FakeTransport;

async fn complete_conversation(controller: &Controller) -> Outcome {
    for input in ["hello", "a@b.com", "Ana"] {
        controller.set_input(input);
        let outcome = controller.submit().await;
        if !matches!(outcome, Outcome::Advanced(_)) {
            return outcome;
        }
    }

    Outcome::Busy
}

#[tokio::test(start_paused = true)]
async fn test_terminal_sent_resets_after_three_seconds() {
    let controller = Controller::new(Variant::Terminal, FakeTransport::delivering());

    controller.set_input("hello");
    assert_eq!(controller.submit().await, Outcome::Delivered);
    assert_eq!(controller.status(), Status::Sent);

    sleep(Duration::from_millis(2999)).await;
    assert_eq!(controller.status(), Status::Sent);

    sleep(Duration::from_millis(2)).await;
    assert_eq!(controller.status(), Status::Collecting);
    assert_eq!(controller.step(), Step::Message);
    assert!(controller.history().is_empty());
    assert_eq!(controller.input(), "");
}

#[tokio::test(start_paused = true)]
async fn test_conversation_sent_resets_after_six_seconds() {
    let controller = Controller::new(Variant::Conversation, FakeTransport::delivering());

    assert_eq!(complete_conversation(&controller).await, Outcome::Delivered);

    sleep(Duration::from_millis(5999)).await;
    assert_eq!(controller.status(), Status::Sent);
    assert_eq!(controller.history().len(), 5);

    sleep(Duration::from_millis(2)).await;
    assert_eq!(controller.status(), Status::Collecting);
    assert_eq!(controller.step(), Step::Message);
    assert!(controller.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_terminal_error_recovers_and_can_resend() {
    let transport = FakeTransport::failing();
    let controller = Controller::new(Variant::Terminal, transport.clone());

    controller.set_input("hello");
    assert_eq!(controller.submit().await, Outcome::Failed);
    assert_eq!(controller.submit().await, Outcome::Busy);

    sleep(Duration::from_millis(3001)).await;
    assert_eq!(controller.status(), Status::Collecting);
    assert_eq!(controller.input(), "hello");

    transport.set_failing(false);
    assert_eq!(controller.submit().await, Outcome::Delivered);
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_conversation_error_sticks() {
    let transport = FakeTransport::failing();
    let controller = Controller::new(Variant::Conversation, transport.clone());

    assert_eq!(complete_conversation(&controller).await, Outcome::Failed);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(controller.status(), Status::Error);

    controller.set_input("again");
    assert_eq!(controller.submit().await, Outcome::Busy);
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_custom_delays() {
    let controller = Controller::with_delays(
        Variant::Conversation,
        FakeTransport::failing(),
        Duration::from_secs(1),
        Some(Duration::from_millis(500)),
    );

    assert_eq!(complete_conversation(&controller).await, Outcome::Failed);

    sleep(Duration::from_millis(501)).await;
    assert_eq!(controller.status(), Status::Collecting);
    assert_eq!(controller.step(), Step::Message);
}

#[tokio::test(start_paused = true)]
async fn test_error_recovery_returns_to_first_step_with_message() {
    let transport = FakeTransport::failing();
    let controller = Controller::with_delays(
        Variant::Conversation,
        transport.clone(),
        Duration::from_secs(1),
        Some(Duration::from_secs(1)),
    );

    assert_eq!(complete_conversation(&controller).await, Outcome::Failed);
    let before = controller.history().len();

    sleep(Duration::from_millis(1001)).await;
    assert_eq!(controller.status(), Status::Collecting);
    assert_eq!(controller.step(), Step::Message);
    assert_eq!(controller.input(), "hello");
    assert_eq!(
        controller.history().last(),
        Some(&Entry::question(Variant::Conversation.prompt(Step::Message)))
    );
    assert_eq!(controller.history().len(), before + 1);

    transport.set_failing(false);
    assert_eq!(complete_conversation(&controller).await, Outcome::Delivered);
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_every_transition() {
    let (transport, gate) = FakeTransport::gated();
    let controller = Controller::new(Variant::Terminal, transport);
    let mut status = controller.subscribe();

    controller.set_input("hello");
    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });

    status.changed().await.unwrap();
    assert_eq!(*status.borrow_and_update(), Status::Sending);

    gate.notify_one();
    status.changed().await.unwrap();
    assert_eq!(*status.borrow_and_update(), Status::Sent);
    assert_eq!(pending.await.unwrap(), Outcome::Delivered);

    status.changed().await.unwrap();
    assert_eq!(*status.borrow_and_update(), Status::Collecting);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_zero_delay_reset_is_published_last() {
    for _ in 0..50 {
        let controller = Controller::with_delays(
            Variant::Terminal,
            FakeTransport::delivering(),
            Duration::ZERO,
            Some(Duration::ZERO),
        );
        let mut status = controller.subscribe();

        controller.set_input("hello");
        assert_eq!(controller.submit().await, Outcome::Delivered);

        timeout(
            Duration::from_secs(1),
            status.wait_for(|status| *status == Status::Collecting),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(*status.borrow(), Status::Collecting);
        assert_eq!(controller.status(), Status::Collecting);
    }
}
