//! Live-socket tests: serving, config reload, and graceful shutdown.

use std::time::Duration;

use tokio::sync::mpsc;

use legacy_view_bridge::{BridgeConfig, HttpServer, Shutdown};

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_reload_changes_view_root() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(BridgeConfig::default(), common::test_registry()).unwrap();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        server.run(listener, config_updates, server_shutdown).await
    });

    let client = client();
    let res = client
        .get(format!("http://{addr}/user"))
        .send()
        .await
        .expect("Bridge unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-view-path"], "/WEB-INF/view/user/list.jsp");

    let mut config = BridgeConfig::default();
    config.view.view_root = "/views".into();
    config_tx.send(config).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let res = client.get(format!("http://{addr}/user")).send().await.unwrap();
    assert_eq!(res.headers()["x-view-path"], "/views/user/list.jsp");

    let res = client.get(format!("http://{addr}/docs")).send().await.unwrap();
    assert_eq!(res.status(), 302);

    drop(client);
    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Server did not shut down");
    assert!(result.unwrap().is_ok());
}
