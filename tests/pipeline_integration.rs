use monogatari::content::{ContentConfig, ContentManager, RenderedContent};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn manager_for(root: &Path) -> ContentManager {
    ContentManager::new(ContentConfig {
        source_directory: root.to_path_buf(),
        ..ContentConfig::default()
    })
}

#[tokio::test]
async fn test_full_pipeline_for_one_document() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        temp_dir.path(),
        "hello.md",
        "---\ntitle: Hello\ndate: 2024-01-01\ntags: a, b\n---\n# Hi {#top}\n\nBody text.\n<!--more-->\nMore body.",
    );

    let manager = manager_for(temp_dir.path());
    manager.refresh().await.unwrap();

    let post = manager.get_post("hello").await.unwrap();
    assert_eq!(post.metadata.title.as_deref(), Some("Hello"));
    assert_eq!(post.metadata.date.as_deref(), Some("2024-01-01"));
    assert_eq!(
        post.metadata.tags.to_vec(),
        vec!["a".to_string(), "b".to_string()]
    );
    assert_eq!(post.excerpt, "# Hi {#top}\n\nBody text.");

    let RenderedContent::Html(html) = &post.rendered else {
        panic!("expected html render");
    };
    assert!(html.contains("<h1 id=\"top\">Hi</h1>"), "{html}");
    assert!(html.contains("Body text."));
    assert!(html.contains("More body."));
    assert!(!html.contains("<!--more-->"));
}

#[tokio::test]
async fn test_pipeline_with_folder_defaults_and_extensions() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        temp_dir.path(),
        "pages.yaml",
        "defaults:\n  author:\n    name: Narrator\n",
    );
    write_file(
        temp_dir.path(),
        "lab/report.md",
        concat!(
            "---\ntitle: Field Report\n---\n",
            "> [!hazard] Radiation beyond the fence.\n\n",
            "```mermaid\ngraph LR;\n```\n\n",
            "See [the appendix](appendix.md#data).\n",
        ),
    );

    let manager = manager_for(temp_dir.path());
    manager.refresh().await.unwrap();

    let post = manager.get_post("lab/report").await.unwrap();
    assert_eq!(post.section, "lab");
    assert_eq!(
        post.metadata.author.as_ref().and_then(|a| a.name.as_deref()),
        Some("Narrator")
    );

    let RenderedContent::Html(html) = &post.rendered else {
        panic!("expected html render");
    };
    assert!(html.contains("data-admonition=\"hazard\""), "{html}");
    assert!(html.contains("class=\"mermaid-diagram\""), "{html}");
    assert!(html.contains("href=\"appendix#data\""), "{html}");
}

#[tokio::test]
async fn test_chat_document_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        temp_dir.path(),
        "story.md",
        concat!(
            "---\ntitle: Night Shift\nmode: chat\n---\n",
            "The terminal flickers on.\n",
            "--- {\"type\": \"system\", \"delay\": 800}\n",
            "`BOOT SEQUENCE COMPLETE`\n",
            "--- {\"action\": \"end\"}\n",
        ),
    );

    let manager = manager_for(temp_dir.path());
    manager.refresh().await.unwrap();

    let post = manager.get_post("story").await.unwrap();
    let RenderedContent::Segments(segments) = &post.rendered else {
        panic!("expected segments");
    };
    assert_eq!(segments.len(), 3);
    assert!(segments[0].html.contains("The terminal flickers on."));
    assert_eq!(segments[1].metadata.delay_ms, Some(800));
    assert!(segments[1].html.contains("<code>BOOT SEQUENCE COMPLETE</code>"));
    assert_eq!(
        segments[2].metadata.action,
        Some(monogatari::markdown::StoryAction::End)
    );
    assert_eq!(segments[2].html, "");
}
