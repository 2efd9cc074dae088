use astroblog::{
    models::{CreatePostRequest, CreateTagRequest, UpdatePostRequest},
    validation::{self, Validate},
};
use uuid::Uuid;

// --- Helper Functions ---

fn valid_post() -> CreatePostRequest {
    CreatePostRequest {
        title: "Hello Rust".to_string(),
        slug: "hello-rust".to_string(),
        content: "<p>Ownership, borrowing and lifetimes.</p>".to_string(),
        ..Default::default()
    }
}

fn valid_tag() -> CreateTagRequest {
    CreateTagRequest {
        name: "Web Dev".to_string(),
        slug: "web-dev".to_string(),
        ..Default::default()
    }
}

// --- Individual Rules ---

#[test]
fn test_slug_rule() {
    for ok in ["a", "hello-world", "post-2024-recap", "x1-y2"] {
        assert!(validation::slug(ok).is_ok(), "{ok} should be valid");
    }
    for bad in ["", "Hello", "double--hyphen", "-leading", "trailing-", "with space", "ünï"] {
        assert!(validation::slug(bad).is_err(), "{bad:?} should be rejected");
    }
    assert!(validation::slug(&"a".repeat(201)).is_err());
}

#[test]
fn test_title_rule() {
    assert!(validation::title("A title").is_ok());
    assert!(validation::title("   ").is_err());
    assert!(validation::title(&"t".repeat(200)).is_ok());
    assert!(validation::title(&"t".repeat(201)).is_err());
}

#[test]
fn test_content_rejects_dangerous_html() {
    assert!(validation::content("<p>safe</p>").is_ok());
    assert!(validation::content(r#"<meta name="x" content="y">"#).is_ok());

    for bad in [
        "<script>alert(1)</script>",
        "<SCRIPT type=\"text/javascript\">\nx()\n</SCRIPT>",
        "<iframe src=\"https://evil.test\"></iframe>",
        "<a href=\"javascript:alert(1)\">x</a>",
        "<img src=x onerror=alert(1)>",
        "<body onload = run()>",
    ] {
        assert!(validation::content(bad).is_err(), "{bad:?} should be rejected");
    }
}

#[test]
fn test_content_length_bounds() {
    assert!(validation::content("").is_err());
    assert!(validation::content(&"a".repeat(50_000)).is_ok());
    assert!(validation::content(&"a".repeat(50_001)).is_err());
}

#[test]
fn test_meta_description_window() {
    assert!(validation::meta_description(&"d".repeat(119)).is_err());
    assert!(validation::meta_description(&"d".repeat(120)).is_ok());
    assert!(validation::meta_description(&"d".repeat(160)).is_ok());
    assert!(validation::meta_description(&"d".repeat(161)).is_err());
}

#[test]
fn test_keywords_and_tag_limits() {
    let ten: Vec<String> = (0..10).map(|i| format!("kw{i}")).collect();
    assert!(validation::keywords(&ten).is_ok());

    let eleven: Vec<String> = (0..11).map(|i| format!("kw{i}")).collect();
    assert!(validation::keywords(&eleven).is_err());
    assert!(validation::keywords(&[String::new()]).is_err());
    assert!(validation::keywords(&["k".repeat(51)]).is_err());

    let ids: Vec<Uuid> = (0..11).map(|_| Uuid::new_v4()).collect();
    assert!(validation::tag_ids(&ids[..10]).is_ok());
    assert!(validation::tag_ids(&ids).is_err());
}

#[test]
fn test_tag_name_and_color_rules() {
    assert!(validation::tag_name("Best Practices").is_ok());
    assert!(validation::tag_name("web-dev 2").is_ok());
    assert!(validation::tag_name("").is_err());
    assert!(validation::tag_name("C++").is_err());
    assert!(validation::tag_name(&"n".repeat(51)).is_err());

    assert!(validation::color(validation::DEFAULT_TAG_COLOR).is_ok());
    assert!(validation::color("#ff00aa").is_ok());
    for bad in ["ff00aa", "#ff00a", "#ff00aag", "#GGGGGG", "red"] {
        assert!(validation::color(bad).is_err(), "{bad:?} should be rejected");
    }
}

// --- Payload Validation ---

#[test]
fn test_valid_create_post_passes_through() {
    let request = valid_post();
    let validated = request.clone().validate().unwrap();
    assert_eq!(validated.slug, request.slug);
}

#[test]
fn test_create_post_collects_every_violation() {
    let request = CreatePostRequest {
        title: " ".to_string(),
        slug: "Not A Slug".to_string(),
        content: "<script>x</script>".to_string(),
        meta_title: Some("m".repeat(61)),
        ..Default::default()
    };

    let errors = request.validate().unwrap_err();

    for field in ["title", "slug", "content", "meta_title"] {
        assert!(errors.has_field(field), "expected a violation on {field}");
    }
    assert!(!errors.has_field("excerpt"));
    assert_eq!(errors.violations().len(), 4);
}

#[test]
fn test_update_post_only_checks_present_fields() {
    assert!(UpdatePostRequest::default().validate().is_ok());

    let request = UpdatePostRequest {
        excerpt: Some("e".repeat(501)),
        featured: Some(true),
        ..Default::default()
    };
    let errors = request.validate().unwrap_err();
    assert!(errors.has_field("excerpt"));
    assert_eq!(errors.violations().len(), 1);
}

#[test]
fn test_create_tag_validation() {
    assert!(valid_tag().validate().is_ok());

    let request = CreateTagRequest {
        color: Some("blue".to_string()),
        description: Some("d".repeat(201)),
        ..valid_tag()
    };
    let errors = request.validate().unwrap_err();
    assert!(errors.has_field("color"));
    assert!(errors.has_field("description"));
    assert!(!errors.has_field("name"));
}
