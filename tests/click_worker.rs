mod common;

use shortlink::domain::click_job::ClickJob;
use shortlink::domain::click_worker::{ClickDispatcher, run_click_worker};
use shortlink::domain::entities::ClickMeta;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_worker_drains_queue_on_close() {
    let app = common::create_test_app();

    let link = app
        .state
        .link_service
        .create_short_link(common::create_request("https://example.com"))
        .await
        .unwrap();

    let (dispatcher, rx) = ClickDispatcher::channel(64);
    for _ in 0..20 {
        assert!(dispatcher.dispatch(ClickJob::new(link.code.clone(), ClickMeta::default())));
    }
    assert!(dispatcher.dispatch(ClickJob::new("missing", ClickMeta::default())));

    let worker = tokio::spawn(run_click_worker(rx, app.state.stats_service.clone(), 4));
    drop(dispatcher);

    let report = worker.await.unwrap();
    assert_eq!(report.recorded, 20);
    assert_eq!(report.failed, 1);

    let stats = app.state.stats_service.get_stats(&link.code).await.unwrap();
    assert_eq!(stats.link.click_count, 20);
}

#[tokio::test]
async fn test_full_queue_drops_clicks() {
    let (dispatcher, _rx) = ClickDispatcher::channel(2);

    assert!(dispatcher.dispatch(ClickJob::new("a", ClickMeta::default())));
    assert!(dispatcher.dispatch(ClickJob::new("b", ClickMeta::default())));
    assert!(!dispatcher.dispatch(ClickJob::new("c", ClickMeta::default())));
    assert_eq!(dispatcher.available(), 0);
}

#[tokio::test]
async fn test_dispatch_after_worker_stopped() {
    let (dispatcher, rx) = ClickDispatcher::channel(2);
    drop(rx);

    assert!(dispatcher.is_closed());
    assert!(!dispatcher.dispatch(ClickJob::new("a", ClickMeta::default())));
}
