//! Full chain over real sockets: front door, relay, both services.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;

use relay_chain::protocol::{framed, TOKEN_LEN};
use relay_chain::store::{MemoryTokenStore, TokenStore};

mod common;
use common::{http_client, local_config, start_app, start_app_with_store};

async fn call(addr: std::net::SocketAddr, request: &[u8]) -> Vec<u8> {
    let stream = TcpStream::connect(addr).await.unwrap();
    let mut frames = framed(stream, 1024 * 1024);
    frames.send(Bytes::copy_from_slice(request)).await.unwrap();
    frames.next().await.unwrap().unwrap().to_vec()
}

#[tokio::test]
async fn empty_body_relays_default_payload() {
    let (app, _shutdown) = start_app(&local_config()).await;
    let url = format!("http://{}/", app.front_door_addr);

    let res = http_client().post(&url).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "HELLO WORLD!");
}

#[tokio::test]
async fn body_is_upper_cased() {
    let (app, _shutdown) = start_app(&local_config()).await;
    let url = format!("http://{}/anything/here", app.front_door_addr);

    let res = http_client().put(&url).body("input").send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "INPUT");
}

#[tokio::test]
async fn each_request_mints_a_new_token() {
    let store = MemoryTokenStore::new();
    let (app, _shutdown) = start_app_with_store(&local_config(), Arc::new(store.clone())).await;
    let url = format!("http://{}/", app.front_door_addr);
    let client = http_client();

    for body in ["one", "two"] {
        let res = client.post(&url).body(body).send().await.unwrap();
        assert_eq!(res.status(), 200);
    }

    let tokens = store.tokens();
    assert_eq!(tokens.len(), 2);
    assert_ne!(tokens[0], tokens[1]);
    for token in tokens {
        assert_eq!(token.len(), TOKEN_LEN);
        assert_eq!(store.get(&token).unwrap(), Some(true));
    }
}

#[tokio::test]
async fn services_speak_the_frame_protocol() {
    let (app, _shutdown) = start_app(&local_config()).await;
    let auth = app.auth_addr.unwrap();
    let transform = app.transform_addr.unwrap();

    assert_eq!(call(auth, &[9, 9, 9, 9]).await, vec![0]);
    assert_eq!(call(auth, &[1, 2]).await, vec![0]);

    let reply = call(auth, &[1, 2, 3, 4]).await;
    assert_eq!(reply[0], 1);
    assert_eq!(reply.len(), 1 + TOKEN_LEN);
    let token = &reply[1..];

    let request = [token, b"mixed Case"].concat();
    assert_eq!(call(transform, &request).await, b"\x01MIXED CASE".to_vec());

    // Tokens stay valid after use.
    assert_eq!(call(transform, &request).await, b"\x01MIXED CASE".to_vec());

    let forged = [&[b'0'; TOKEN_LEN][..], b"x"].concat();
    assert_eq!(call(transform, &forged).await, vec![0]);
}

#[tokio::test]
async fn one_connection_carries_several_frames() {
    let (app, _shutdown) = start_app(&local_config()).await;
    let stream = TcpStream::connect(app.auth_addr.unwrap()).await.unwrap();
    let mut frames = framed(stream, 1024);

    for _ in 0..3 {
        frames.send(Bytes::from_static(&[1, 2, 3, 4])).await.unwrap();
        let reply = frames.next().await.unwrap().unwrap();
        assert_eq!(reply[0], 1);
    }
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let (app, _shutdown) = start_app(&local_config()).await;
    let url = format!("http://{}/", app.front_door_addr);
    let client = http_client();

    let mut handles = Vec::new();
    for i in 0..32 {
        let client = client.clone();
        let url = url.clone();
        handles.push(tokio::spawn(async move {
            let body = format!("request-{i}");
            let res = client.post(&url).body(body.clone()).send().await.unwrap();
            assert_eq!(res.status(), 200);
            assert_eq!(res.text().await.unwrap(), body.to_uppercase());
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn external_services_can_replace_in_process_ones() {
    // First chain provides the services; second one relays to them.
    let (backends, _backends_shutdown) = start_app(&local_config()).await;

    let mut config = local_config();
    config.auth_service.enabled = false;
    config.transform_service.enabled = false;
    config.relay.auth_address = Some(backends.auth_addr.unwrap().to_string());
    config.relay.transform_address = Some(backends.transform_addr.unwrap().to_string());
    let (app, _shutdown) = start_app(&config).await;
    assert!(app.auth_addr.is_none());

    let url = format!("http://{}/", app.front_door_addr);
    let res = http_client().post(&url).body("remote").send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "REMOTE");
}
