//! 통합 테스트 공통 헬퍼

#![allow(dead_code)]

use plinth_core::{
    ArtifactDependency, ArtifactIdentifier, InMemoryRegistry, InMemoryRepository, ManifestIdentifier,
};
use plinth_foundation::Version;
use std::sync::Arc;

pub fn id(s: &str) -> ArtifactIdentifier {
    s.parse().expect("valid artifact identifier")
}

pub fn manifest(s: &str) -> ManifestIdentifier {
    s.parse().expect("valid manifest identifier")
}

pub fn v(s: &str) -> Version {
    Version::parse(s).expect("valid version")
}

pub fn requires(parent: &str, child: &str) -> ArtifactDependency {
    ArtifactDependency::required(id(parent), id(child))
}

pub fn optional(parent: &str, child: &str) -> ArtifactDependency {
    ArtifactDependency::optional(id(parent), id(child))
}

pub fn provided(parent: &str, child: &str) -> ArtifactDependency {
    ArtifactDependency::provided(id(parent), id(child))
}

pub fn setup() -> (Arc<InMemoryRepository>, Arc<InMemoryRegistry>) {
    let repository = Arc::new(InMemoryRepository::new());
    let registry = Arc::new(InMemoryRegistry::new(Arc::clone(&repository)));
    (repository, registry)
}
