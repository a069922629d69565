use medialens_api::resolve::{HttpResolver, LinkResolver};

#[tokio::test]
async fn resolver_follows_redirects_to_final_url() {
    let mut server = mockito::Server::new_async().await;

    let redirect = server
        .mock("GET", "/t/ZT8abcdef/")
        .with_status(302)
        .with_header("Location", "/@user/video/7123456789")
        .create_async()
        .await;
    let target = server
        .mock("GET", "/@user/video/7123456789")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let resolver = HttpResolver::new();
    let resolved = resolver
        .resolve(&format!("{}/t/ZT8abcdef/", server.url()))
        .await
        .expect("resolution should succeed");

    assert_eq!(resolved, format!("{}/@user/video/7123456789", server.url()));
    redirect.assert_async().await;
    target.assert_async().await;
}

#[tokio::test]
async fn resolution_error_surfaces_and_caller_falls_back() {
    // Nothing listens here; the connection is refused immediately.
    let original = "http://127.0.0.1:9/t/ZT8abcdef/";

    let resolver = HttpResolver::new();
    let result = resolver.resolve(original).await;
    assert!(result.is_err());

    // The dispatcher contract: a failed resolution means "use the original"
    let url = result.unwrap_or_else(|_| original.to_string());
    assert_eq!(url, original);
}

#[tokio::test]
async fn non_redirecting_url_resolves_to_itself() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/plain")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let resolver = HttpResolver::new();
    let url = format!("{}/plain", server.url());
    let resolved = resolver.resolve(&url).await.unwrap();

    assert_eq!(resolved, url);
    mock.assert_async().await;
}
