// ABOUTME: Integration tests for image references and Kubernetes resource names.
// ABOUTME: Tests parsing, validation, and the helpers registry dispatch relies on.

use setimg::types::*;

mod image_ref_tests {
    use super::*;

    #[test]
    fn parse_simple_name() {
        let img = ImageRef::parse("nginx").unwrap();
        assert_eq!(img.name(), "nginx");
        assert!(img.tag().is_none());
        assert!(img.registry().is_none());
        assert_eq!(img.registry_host(), DEFAULT_REGISTRY);
    }

    #[test]
    fn parse_with_org() {
        let img = ImageRef::parse("ghcr.io/org/repo:latest").unwrap();
        assert_eq!(img.registry(), Some("ghcr.io"));
        assert_eq!(img.name(), "org/repo");
        assert_eq!(img.tag(), Some("latest"));
    }

    #[test]
    fn port_is_not_a_tag() {
        let img = ImageRef::parse("localhost:5000/app").unwrap();
        assert_eq!(img.registry(), Some("localhost:5000"));
        assert_eq!(img.name(), "app");
        assert!(img.tag().is_none());
    }

    #[test]
    fn parse_with_digest() {
        let digest = "sha256:abc123def456";
        let img = ImageRef::parse(&format!("nginx@{}", digest)).unwrap();
        assert_eq!(img.digest(), Some(digest));
        assert!(img.tag().is_none());
        assert_eq!(img.repository(), "nginx");
    }

    #[test]
    fn repository_strips_tag() {
        let img = ImageRef::parse("gcr.io/project/api:v1.2.3").unwrap();
        assert_eq!(img.repository(), "gcr.io/project/api");
        assert_eq!(img.with_tag("v2.0.0"), "gcr.io/project/api:v2.0.0");
    }

    #[test]
    fn parse_empty_returns_error() {
        assert_eq!(ImageRef::parse(""), Err(ParseImageRefError::Empty));
    }

    #[test]
    fn parse_invalid_chars_returns_error() {
        assert!(matches!(
            ImageRef::parse("nginx latest"),
            Err(ParseImageRefError::InvalidChar(' '))
        ));
    }

    #[test]
    fn empty_tag_returns_error() {
        assert!(matches!(
            ImageRef::parse("nginx:"),
            Err(ParseImageRefError::InvalidFormat(_))
        ));
    }

    #[test]
    fn display_formats_correctly() {
        let input = "registry.example.com/team/app:v1";
        assert_eq!(ImageRef::parse(input).unwrap().to_string(), input);
    }
}

mod resource_name_tests {
    use super::*;

    #[test]
    fn valid_deployment_with_dots() {
        let name = DeploymentName::new("api.v2-canary").unwrap();
        assert_eq!(name.as_str(), "api.v2-canary");
    }

    #[test]
    fn container_rejects_dots() {
        assert!(matches!(
            ContainerName::new("app.main"),
            Err(ResourceNameError::InvalidChar { c: '.', .. })
        ));
    }

    #[test]
    fn empty_returns_error() {
        assert!(matches!(
            DeploymentName::new(""),
            Err(ResourceNameError::Empty { .. })
        ));
    }

    #[test]
    fn too_long_returns_error() {
        let long = "a".repeat(64);
        assert!(matches!(
            ContainerName::new(&long),
            Err(ResourceNameError::TooLong { max: 63, .. })
        ));
        assert!(ContainerName::new(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn starts_with_hyphen_returns_error() {
        assert!(matches!(
            ContainerName::new("-web"),
            Err(ResourceNameError::BadBoundary { .. })
        ));
    }

    #[test]
    fn uppercase_returns_error() {
        assert!(matches!(
            DeploymentName::new("MyApp"),
            Err(ResourceNameError::NotLowercase { .. })
        ));
    }
}
