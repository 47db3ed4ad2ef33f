//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl, graph, rank and storage cycle end-to-end.

use sitegraph::config::Config;
use sitegraph::crawler::crawl;
use sitegraph::graph::{GraphAnalyzer, GraphBuilder, RankEngine};
use sitegraph::state::PageState;
use sitegraph::storage::{GraphStorage, SqliteStorage};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_robots(server: &MockServer, content: &str) {
    Mock::given(method("HEAD"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(content.to_string()))
        .mount(server)
        .await;
}

/// `/` links to `/a`, a robots-protected page, another host and a dead link;
/// `/a` links back home and on to `/b`.
async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r##"<html><head><title>Home</title></head><body>
            <a href="/a">A</a>
            <a href="/private/secret">Secret</a>
            <a href="http://other.example.org/x">Elsewhere</a>
            <a href="/missing">Missing</a>
            <a href="#top">Top</a>
            </body></html>"##,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(
            r#"<html><body><a href="/">Home</a><a href="b">B</a></body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("<html><body>Leaf</body></html>"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html("<html><body>Secret</body></html>"))
        .mount(server)
        .await;
}

async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_respects_robots_and_scope() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_site(&server).await;

    let root_url = format!("{}/", server.uri());
    let report = crawl(&root_url, &Config::default())
        .await
        .expect("crawl should start");

    assert_eq!(report.root.link(), root_url);
    assert_eq!(report.pages_processed, 3);
    assert_eq!(report.pages_errored, 1);
    assert_eq!(report.pages_discovered, 4);
    assert_eq!(report.faults, 0);

    let root_children: Vec<String> = report
        .root
        .children()
        .iter()
        .map(|c| c.link().to_string())
        .collect();
    assert_eq!(root_children, vec![format!("{}/a", server.uri())]);

    let paths = requested_paths(&server).await;
    assert!(!paths.iter().any(|p| p.starts_with("/private")));
    assert_eq!(paths.iter().filter(|p| *p == "/robots.txt").count(), 2);
    assert_eq!(paths.iter().filter(|p| *p == "/").count(), 1);
}

#[tokio::test]
async fn test_graph_and_rank_of_crawl() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_site(&server).await;

    let root_url = format!("{}/", server.uri());
    let report = crawl(&root_url, &Config::default()).await.unwrap();

    let mut builder = GraphBuilder::new();
    let graph = builder.build(&report.root);

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(
        graph.node(&root_url).unwrap().title.as_deref(),
        Some("Home")
    );
    assert_eq!(builder.expanded().len(), 3);

    let ranks = RankEngine::default().rank(&graph, &root_url);
    assert_eq!(ranks.len(), 3);

    let base = 0.15 / 3.0;
    let b = format!("{}/b", server.uri());
    let a = format!("{}/a", server.uri());
    assert!((ranks.get(&root_url).unwrap() - (base + 0.85)).abs() < 1e-9);
    assert!((ranks.get(&a).unwrap() - (base + 0.85 / 2.0)).abs() < 1e-9);
    assert!((ranks.get(&b).unwrap() - base).abs() < 1e-9);

    let analysis = GraphAnalyzer::analyze(&graph, 10);
    assert_eq!(analysis.node_count, 3);
    assert_eq!(analysis.errored_nodes, 0);
    assert_eq!(analysis.degree_sample[0], (root_url.clone(), 2));
}

#[tokio::test]
async fn test_robots_honoured_when_head_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .mount(&server)
        .await;
    mount_site(&server).await;

    let root_url = format!("{}/", server.uri());
    let report = crawl(&root_url, &Config::default()).await.unwrap();

    assert!(report.root.robots().is_some());
    assert!(!requested_paths(&server)
        .await
        .iter()
        .any(|p| p.starts_with("/private")));
    assert_eq!(report.pages_processed, 3);
}

#[tokio::test]
async fn test_missing_robots_fails_open() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let root_url = format!("{}/", server.uri());
    let report = crawl(&root_url, &Config::default()).await.unwrap();

    assert!(report.root.robots().is_none());
    assert!(report
        .root
        .has_child(&format!("{}/private/secret", server.uri())));
    assert_eq!(report.pages_processed, 4);
}

#[tokio::test]
async fn test_html_robots_page_is_ignored() {
    let server = MockServer::start().await;
    mount_robots(&server, "<html><body>Not found, but 200 anyway</body></html>").await;
    mount_site(&server).await;

    let root_url = format!("{}/", server.uri());
    let report = crawl(&root_url, &Config::default()).await.unwrap();

    assert!(report.root.robots().is_none());
    assert!(requested_paths(&server)
        .await
        .iter()
        .any(|p| p == "/private/secret"));
}

#[tokio::test]
async fn test_unreachable_root_gives_single_node_graph() {
    let server = MockServer::start().await;

    let root_url = format!("{}/", server.uri());
    let report = crawl(&root_url, &Config::default()).await.unwrap();

    assert!(report.root.is_errored());

    let graph = GraphBuilder::new().build(&report.root);
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.node(&root_url).unwrap().state, PageState::Errored);
}

#[tokio::test]
async fn test_invalid_root_is_rejected() {
    let result = crawl("mailto:someone@example.com", &Config::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_persisted_graph_reloads_with_identical_counts() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_site(&server).await;

    let root_url = format!("{}/", server.uri());
    let report = crawl(&root_url, &Config::default()).await.unwrap();
    let graph = GraphBuilder::new().build(&report.root);
    let ranks = RankEngine::default().rank(&graph, &root_url);

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("sitegraph.db");

    let run_id = {
        let mut storage = SqliteStorage::new(&db_path).unwrap();
        let run_id = storage.create_run(&root_url, "test_hash").unwrap();
        storage.save_graph(run_id, &graph).unwrap();
        storage.save_ranks(run_id, &ranks).unwrap();
        storage.complete_run(run_id).unwrap();
        run_id
    };

    let storage = SqliteStorage::new(&db_path).unwrap();
    let latest = storage.get_latest_run(&root_url).unwrap().unwrap();
    assert_eq!(latest.id, run_id);
    assert_eq!(latest.config_hash, "test_hash");

    let loaded = storage.load_graph(run_id).unwrap();
    assert_eq!(loaded.node_count(), graph.node_count());
    assert_eq!(loaded.edge_count(), graph.edge_count());
    assert!(loaded.nodes().eq(graph.nodes()));

    let reranked = RankEngine::default().rank(&loaded, &root_url);
    assert_eq!(reranked, storage.load_ranks(run_id).unwrap());
}
