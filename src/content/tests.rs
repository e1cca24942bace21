#[cfg(test)]
mod tests {
    use super::super::*;
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
            posts_per_page: 2,
            excerpt_length: 80,
            ..ContentConfig::default()
        })
    }

    #[tokio::test]
    async fn test_zero_page_size_is_clamped() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "one.md",
            "---\ntitle: One\ndate: 2024-01-01\n---\nBody.",
        );

        let manager = ContentManager::new(ContentConfig {
            source_directory: temp_dir.path().to_path_buf(),
            posts_per_page: 0,
            ..ContentConfig::default()
        });
        manager.refresh().await.unwrap();

        assert_eq!(manager.get_total_pages().await, 1);
        assert_eq!(manager.get_page(0).await.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_loads_documents() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "hello.md",
            "---\ntitle: Hello\ndate: 2024-01-01\n---\nBody text.",
        );

        let manager = manager_for(temp_dir.path());
        manager.refresh().await.unwrap();

        let post = manager.get_post("hello").await.unwrap();
        assert_eq!(post.metadata.title.as_deref(), Some("Hello"));
        assert_eq!(post.slug, "hello");
        assert_eq!(post.content, "Body text.");
        match &post.rendered {
            RenderedContent::Html(html) => assert!(html.contains("<p>Body text.</p>")),
            RenderedContent::Segments(_) => panic!("expected html render"),
        }
    }

    #[tokio::test]
    async fn test_untitled_documents_are_dropped() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "untitled.md", "No frontmatter at all.");

        let manager = manager_for(temp_dir.path());
        manager.refresh().await.unwrap();

        assert!(manager.get_post("untitled").await.is_none());
        assert_eq!(manager.get_total_pages().await, 0);
    }

    #[tokio::test]
    async fn test_drafts_excluded_by_default() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "wip.md",
            "---\ntitle: WIP\ndraft: true\n---\nSoon.",
        );

        let manager = manager_for(temp_dir.path());
        manager.refresh().await.unwrap();
        assert!(manager.get_post("wip").await.is_none());

        let manager = ContentManager::new(ContentConfig {
            source_directory: temp_dir.path().to_path_buf(),
            include_drafts: true,
            ..ContentConfig::default()
        });
        manager.refresh().await.unwrap();
        assert!(manager.get_post("wip").await.is_some());
    }

    #[tokio::test]
    async fn test_folder_defaults_merge_under_frontmatter() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "pages.yaml",
            "defaults:\n  author:\n    name: Site Author\n  tags: shared\n",
        );
        write_file(
            temp_dir.path(),
            "series/pages.yaml",
            "defaults:\n  tags: series\n",
        );
        write_file(
            temp_dir.path(),
            "series/one.md",
            "---\ntitle: One\n---\nText.",
        );

        let manager = manager_for(temp_dir.path());
        manager.refresh().await.unwrap();

        let post = manager.get_post("series/one").await.unwrap();
        // nearer folder wins, farther folder still contributes
        assert_eq!(post.metadata.tags.to_vec(), vec!["series".to_string()]);
        assert_eq!(
            post.metadata.author.as_ref().and_then(|a| a.name.as_deref()),
            Some("Site Author")
        );
    }

    #[tokio::test]
    async fn test_chat_mode_renders_segments() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "story.md",
            "---\ntitle: Story\nmode: chat\n---\nOpening.\n--- {\"type\": \"dialogue\"}\n*Hi.*\n",
        );

        let manager = manager_for(temp_dir.path());
        manager.refresh().await.unwrap();

        let post = manager.get_post("story").await.unwrap();
        let RenderedContent::Segments(segments) = &post.rendered else {
            panic!("expected segments");
        };
        assert_eq!(segments.len(), 2);
        assert!(segments[0].html.contains("Opening."));
        assert!(segments[1].html.contains("<em>Hi.</em>"));
        assert_eq!(
            segments[1].metadata.kind,
            Some(crate::markdown::SegmentKind::Dialogue)
        );
    }

    #[tokio::test]
    async fn test_parent_child_links() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "guide.md", "---\ntitle: Guide\n---\nRoot.");
        write_file(
            temp_dir.path(),
            "guide/setup.md",
            "---\ntitle: Setup\n---\nA.",
        );
        write_file(
            temp_dir.path(),
            "guide/usage.md",
            "---\ntitle: Usage\n---\nB.",
        );

        let manager = manager_for(temp_dir.path());
        manager.refresh().await.unwrap();

        let guide = manager.get_post("guide").await.unwrap();
        assert_eq!(
            guide.children,
            vec!["guide/setup".to_string(), "guide/usage".to_string()]
        );
        let setup = manager.get_post("guide/setup").await.unwrap();
        assert_eq!(setup.parent.as_deref(), Some("guide"));
        assert_eq!(setup.section, "guide");
    }

    #[tokio::test]
    async fn test_children_follow_nav_order_and_hide() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "guide.md", "---\ntitle: Guide\n---\nRoot.");
        write_file(
            temp_dir.path(),
            "guide/pages.yaml",
            "nav:\n  - usage\n  - '...'\nhide:\n  - secret\n",
        );
        write_file(
            temp_dir.path(),
            "guide/setup.md",
            "---\ntitle: Setup\n---\nA.",
        );
        write_file(
            temp_dir.path(),
            "guide/usage.md",
            "---\ntitle: Usage\n---\nB.",
        );
        write_file(
            temp_dir.path(),
            "guide/secret.md",
            "---\ntitle: Secret\n---\nC.",
        );

        let manager = manager_for(temp_dir.path());
        manager.refresh().await.unwrap();

        let guide = manager.get_post("guide").await.unwrap();
        assert_eq!(
            guide.children,
            vec!["guide/usage".to_string(), "guide/setup".to_string()]
        );
    }

    #[tokio::test]
    async fn test_pagination_sorted_by_date_descending() {
        let temp_dir = TempDir::new().unwrap();
        for (name, date) in [("a", "2024-01-01"), ("b", "2024-03-01"), ("c", "2024-02-01")] {
            write_file(
                temp_dir.path(),
                &format!("{name}.md"),
                &format!("---\ntitle: {name}\ndate: {date}\n---\nText."),
            );
        }

        let manager = manager_for(temp_dir.path());
        manager.refresh().await.unwrap();

        assert_eq!(manager.get_total_pages().await, 2);
        let first = manager.get_page(0).await;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].slug, "b");
        assert_eq!(first[1].slug, "c");
        let second = manager.get_page(1).await;
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].slug, "a");
        assert!(manager.get_page(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_summary_prefers_description_over_excerpt() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "a.md",
            "---\ntitle: A\ndescription: Hand-written blurb\n---\nAuto excerpt text.",
        );
        write_file(temp_dir.path(), "b.md", "---\ntitle: B\n---\nAuto excerpt text.");

        let manager = manager_for(temp_dir.path());
        manager.refresh().await.unwrap();

        let page = manager.get_page(0).await;
        let a = page.iter().find(|p| p.slug == "a").unwrap();
        let b = page.iter().find(|p| p.slug == "b").unwrap();
        assert_eq!(a.description, "Hand-written blurb");
        assert_eq!(b.description, "Auto excerpt text.");
    }

    #[tokio::test]
    async fn test_get_post_reloads_modified_file() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "a.md", "---\ntitle: A\n---\nOld body.");

        let manager = manager_for(temp_dir.path());
        manager.refresh().await.unwrap();
        assert!(manager.get_post("a").await.unwrap().content.contains("Old"));

        // mtime granularity can be a full second on some filesystems
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        write_file(temp_dir.path(), "a.md", "---\ntitle: A\n---\nNew body.");

        let post = manager.get_post("a").await.unwrap();
        assert!(post.content.contains("New body."));
    }

    #[tokio::test]
    async fn test_validate_reports_issues() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "good.md", "---\ntitle: Good\n---\nFine.");
        write_file(temp_dir.path(), "untitled.md", "---\ndate: 2024-01-01\n---\nNo title.");
        write_file(temp_dir.path(), "broken.md", "---\ntitle: [unclosed\n---\nBody.");

        let manager = manager_for(temp_dir.path());
        let issues = manager.validate();

        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.path.ends_with("untitled.md")));
        assert!(issues.iter().any(|i| i.path.ends_with("broken.md")));
    }

    #[tokio::test]
    async fn test_excerpt_respects_more_marker() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "a.md",
            "---\ntitle: A\n---\nPara one.\n\n<!--more-->\n\nPara two.",
        );

        let manager = manager_for(temp_dir.path());
        manager.refresh().await.unwrap();
        let post = manager.get_post("a").await.unwrap();
        assert_eq!(post.excerpt, "Para one.");
    }
}
