use std::time::Duration;
use url::Url;
use waypoint::{InteractiveSession, PresentationAnchor, WaypointClient};
use waypoint_test_utils::{
    AnchorLookup, Outcome, RecordingHost, ScriptedAuthenticator, init_tracing, test_config,
};

fn callback() -> Url {
    Url::parse("mydapp2://open?type=success&state=s1").unwrap()
}

fn approving() -> ScriptedAuthenticator {
    ScriptedAuthenticator::new(Outcome::Callback(callback()))
}

#[tokio::test]
async fn anchor_from_host_window() {
    init_tracing();
    let session = InteractiveSession::new(approving());
    let host = RecordingHost::with_anchor(AnchorLookup::Some(PresentationAnchor::Window(42)));

    let url = Url::parse("https://id.skymavis.one/wallet/sign").unwrap();
    assert_eq!(session.open(url, "mydapp2", &host).await.unwrap(), callback());
    assert_eq!(
        session.authenticator().last_request().unwrap().anchor,
        PresentationAnchor::Window(42)
    );
}

#[tokio::test]
async fn missing_anchor_falls_back_to_detached() {
    init_tracing();
    let session = InteractiveSession::new(approving());
    let host = RecordingHost::with_anchor(AnchorLookup::None);

    let url = Url::parse("https://id.skymavis.one/wallet/sign").unwrap();
    session.open(url, "mydapp2", &host).await.unwrap();
    assert_eq!(
        session.authenticator().last_request().unwrap().anchor,
        PresentationAnchor::detached()
    );
}

#[tokio::test]
async fn hanging_anchor_lookup_times_out() {
    init_tracing();
    let session = InteractiveSession::new(approving())
        .with_anchor_timeout(Duration::from_millis(10));
    let client = WaypointClient::with_session(test_config(), session);
    let host = RecordingHost::with_anchor(AnchorLookup::Hang);

    let link = client.personal_sign(&host, "s1", "mydapp2://open", "Hello Axie", None).await;
    assert_eq!(link, callback().to_string());
    assert_eq!(
        client.session().authenticator().last_request().unwrap().anchor,
        PresentationAnchor::Detached
    );
}

#[tokio::test]
async fn double_completion_delivers_first() {
    init_tracing();
    let session = InteractiveSession::new(ScriptedAuthenticator::new(Outcome::Pending));
    let host = RecordingHost::new();

    let url = Url::parse("https://id.skymavis.one/wallet/call").unwrap();
    let open = session.open(url, "mydapp2", &host);
    let complete = async {
        while !session.authenticator().has_pending() {
            tokio::task::yield_now().await;
        }
        let completion = session.authenticator().take_pending().remove(0);
        completion.succeed(callback());
        completion.complete(None, None);
        assert!(completion.is_completed());
    };
    let (result, ()) = tokio::join!(open, complete);
    assert_eq!(result.unwrap(), callback());
}
