use std::collections::HashMap;
use url::Url;
use waypoint::{
    Action, ClientConfig, Request, Response, SessionError, WaypointClient, WaypointError,
    deep_link, query,
};
use waypoint_test_utils::{Outcome, RecordingHost, ScriptedAuthenticator, init_tracing, test_config};

const REDIRECT: &str = "mydapp2://open";

fn client(outcome: Outcome) -> WaypointClient<ScriptedAuthenticator> {
    init_tracing();
    WaypointClient::new(test_config(), ScriptedAuthenticator::new(outcome))
}

fn approved(address: &str) -> Outcome {
    Outcome::Approve(Response {
        success: true,
        address: Some(address.to_string()),
        ..Default::default()
    })
}

fn last_params(client: &WaypointClient<ScriptedAuthenticator>) -> HashMap<String, String> {
    let request = client.session().authenticator().last_request().unwrap();
    query::decode(request.url.query().unwrap())
}

#[tokio::test]
async fn send_native_token_round_trip() {
    let client = client(approved("0xdef"));
    let host = RecordingHost::new();
    let state = deep_link::generate_state();

    let link = client
        .send_native_token(
            &host,
            &state,
            REDIRECT,
            "0xD36deD8E1927dCDD76Bfe0CC95a5C1D65c0a807a",
            "100000000000000000",
            None,
        )
        .await;

    let response = deep_link::parse_correlated(&link, &state).unwrap();
    assert!(response.success);
    assert_eq!(response.address.as_deref(), Some("0xdef"));

    let request = client.session().authenticator().last_request().unwrap();
    assert_eq!(request.url.path(), "/wallet/send");
    assert_eq!(request.callback_scheme, "mydapp2");
    assert!(!request.prefers_ephemeral);

    let params = last_params(&client);
    assert_eq!(params["to"], "0xD36deD8E1927dCDD76Bfe0CC95a5C1D65c0a807a");
    assert_eq!(params["value"], "100000000000000000");
    assert_eq!(params["clientId"], "47a4e1a9-2483-4233-9197-364ee5bd2935");
    assert_eq!(params["chainId"], "2021");
    assert_eq!(params["redirect"], REDIRECT);
    assert!(!params.contains_key("data"));
    assert!(!params.contains_key("expectAddress"));

    assert_eq!(host.opened(), vec![Url::parse(&link).unwrap()]);
}

#[tokio::test]
async fn authorize_with_scope() {
    let client = client(approved("0xabc"));
    let host = RecordingHost::new();

    let link = client.authorize(&host, "s1", REDIRECT, Some("openid wallet")).await;
    assert!(deep_link::parse(&link).success);

    let request = client.session().authenticator().last_request().unwrap();
    assert_eq!(request.url.path(), "/client/47a4e1a9-2483-4233-9197-364ee5bd2935/authorize");
    assert_eq!(last_params(&client)["scope"], "openid wallet");
}

#[tokio::test]
async fn typed_data_survives_the_url() {
    let client = client(approved("0xabc"));
    let host = RecordingHost::new();
    let typed_data = serde_json::json!({
        "types": { "EIP712Domain": [{ "name": "name", "type": "string" }] },
        "primaryType": "EIP712Domain",
        "domain": { "name": "Axie & Friends = 1+1" },
        "message": {}
    })
    .to_string();

    let link = client.sign_typed_data(&host, "s1", REDIRECT, &typed_data, Some("0x8d")).await;
    assert!(!link.is_empty());

    let params = last_params(&client);
    assert_eq!(params["typedData"], typed_data);
    assert_eq!(params["expectAddress"], "0x8d");
}

#[tokio::test]
async fn send_transaction_keeps_present_fields() {
    let client = client(approved("0xabc"));
    let host = RecordingHost::new();

    client.send_transaction(&host, "s1", REDIRECT, "0xc0ffee", Some("0x"), None, None).await;

    let params = last_params(&client);
    assert_eq!(params["to"], "0xc0ffee");
    assert_eq!(params["data"], "0x");
    assert!(!params.contains_key("value"));
}

#[tokio::test]
async fn guest_operations() {
    let client = client(approved("0xabc"));
    let host = RecordingHost::new();

    client
        .auth_as_guest(&host, "s1", REDIRECT, "credentialk9", "1727174140", "83b411e9", "wallet")
        .await;
    let request = client.session().authenticator().last_request().unwrap();
    assert_eq!(request.url.path(), "/seamless/guests/start");
    assert_eq!(last_params(&client)["authDate"], "1727174140");

    client.register_guest_account(&host, "s2", REDIRECT).await;
    let request = client.session().authenticator().last_request().unwrap();
    assert_eq!(request.url.path(), "/guests/register");
    assert_eq!(last_params(&client).len(), 4);
}

#[tokio::test]
async fn session_error_passes_through() {
    let error = SessionError::new("The user canceled the login.", 1);
    let client = client(Outcome::Error(error.clone()));
    let host = RecordingHost::new();
    let request = Request::new("s1", REDIRECT, Action::Authorize { scope: None });

    let err = client.execute(&host, &request).await.unwrap_err();
    assert!(matches!(err, WaypointError::Session(ref e) if *e == error));

    assert_eq!(client.authorize(&host, "s1", REDIRECT, None).await, "");
    assert!(host.opened().is_empty());
}

#[tokio::test]
async fn sentinel_errors() {
    let client = client(Outcome::Nothing);
    let host = RecordingHost::new();
    let request = Request::new("s1", REDIRECT, Action::RegisterGuestAccount);

    let err = client.execute(&host, &request).await.unwrap_err();
    assert!(matches!(err, WaypointError::Session(ref e) if e.code == -1));

    client.session().authenticator().set_outcome(Outcome::Refuse);
    let err = client.execute(&host, &request).await.unwrap_err();
    assert!(matches!(err, WaypointError::Session(ref e) if e.code == -2));
    assert_eq!(client.register_guest_account(&host, "s1", REDIRECT).await, "");
}

#[tokio::test]
async fn second_operation_while_pending() {
    let client = client(Outcome::Pending);
    let host = RecordingHost::new();
    let callback = Url::parse("mydapp2://open?type=success&state=first").unwrap();

    let first = client.personal_sign(&host, "first", REDIRECT, "Hello Axie", None);
    let second = async {
        while !client.session().authenticator().has_pending() {
            tokio::task::yield_now().await;
        }
        let second = client.personal_sign(&host, "second", REDIRECT, "Hello again", None).await;
        for completion in client.session().authenticator().take_pending() {
            completion.succeed(callback.clone());
        }
        second
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first, callback.to_string());
    assert_eq!(second, "");
    assert_eq!(client.session().authenticator().requests().len(), 1);
    assert!(!client.session().is_active());
}

#[tokio::test]
async fn callback_returned_even_if_host_cannot_open_it() {
    let callback = Url::parse("mydapp2://open?type=success&state=s1").unwrap();
    let client = client(Outcome::Callback(callback.clone()));
    let host = RecordingHost::new();
    host.set_can_open(false);

    let link = client.personal_sign(&host, "s1", REDIRECT, "Hello Axie", None).await;
    assert_eq!(link, callback.to_string());
    assert_eq!(host.can_open_queries(), 1);
    assert!(host.opened().is_empty());
}

#[tokio::test]
async fn correlation_is_advisory() {
    let stale = Url::parse("mydapp2://open?type=success&state=other").unwrap();
    let client = client(Outcome::Callback(stale));
    let host = RecordingHost::new();

    let link = client.personal_sign(&host, "mine", REDIRECT, "Hello Axie", None).await;
    assert!(deep_link::parse(&link).success);
    assert!(matches!(
        deep_link::parse_correlated(&link, "mine"),
        Err(WaypointError::StateMismatch { .. })
    ));
}

#[tokio::test]
async fn invalid_origin_never_opens_a_session() {
    init_tracing();
    let config = ClientConfig::new("not a url", "client-1", "https://rpc.example", 2021);
    let client = WaypointClient::new(config, ScriptedAuthenticator::new(approved("0xabc")));
    let host = RecordingHost::new();

    let request = Request::new("s1", REDIRECT, Action::RegisterGuestAccount);
    let err = client.execute(&host, &request).await.unwrap_err();
    assert!(matches!(err, WaypointError::InvalidEndpoint { .. }));
    assert!(client.session().authenticator().requests().is_empty());
    assert_eq!(client.register_guest_account(&host, "s1", REDIRECT).await, "");
}
