//! Resources discovered inside a stack.
//!
//! Only a handful of resource types need special handling around a stack
//! delete; the kind is resolved once, when the resource is built.

use serde::{Deserialize, Serialize};

/// Provider type of a storage bucket.
pub const STORAGE_BUCKET_TYPE: &str = "AWS::S3::Bucket";
/// Provider type of a container image repository.
pub const IMAGE_REPOSITORY_TYPE: &str = "AWS::ECR::Repository";
/// Provider type of an access role.
pub const ACCESS_ROLE_TYPE: &str = "AWS::IAM::Role";

/// Cleanup-relevant kind of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Must be emptied before the stack delete, and removed after it.
    StorageBucket,
    /// Must be emptied of images before the stack delete.
    ImageRepository,
    /// Triggers a namespace-wide role sweep after the stack delete.
    AccessRole,
    Other,
}

impl ResourceKind {
    pub fn from_resource_type(resource_type: &str) -> Self {
        match resource_type {
            STORAGE_BUCKET_TYPE => ResourceKind::StorageBucket,
            IMAGE_REPOSITORY_TYPE => ResourceKind::ImageRepository,
            ACCESS_ROLE_TYPE => ResourceKind::AccessRole,
            _ => ResourceKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::StorageBucket => "storage-bucket",
            ResourceKind::ImageRepository => "image-repository",
            ResourceKind::AccessRole => "access-role",
            ResourceKind::Other => "other",
        }
    }
}

/// A single provisioned item belonging to a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawResource", into = "RawResource")]
pub struct Resource {
    pub resource_type: String,
    pub physical_resource_id: Option<String>,
    kind: ResourceKind,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, physical_resource_id: Option<String>) -> Self {
        let resource_type = resource_type.into();
        let kind = ResourceKind::from_resource_type(&resource_type);
        Self {
            resource_type,
            physical_resource_id,
            kind,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

/// Wire shape of a resource; the kind is derived, never stored.
#[derive(Serialize, Deserialize)]
struct RawResource {
    resource_type: String,
    #[serde(default)]
    physical_resource_id: Option<String>,
}

impl From<RawResource> for Resource {
    fn from(raw: RawResource) -> Self {
        Resource::new(raw.resource_type, raw.physical_resource_id)
    }
}

impl From<Resource> for RawResource {
    fn from(resource: Resource) -> Self {
        RawResource {
            resource_type: resource.resource_type,
            physical_resource_id: resource.physical_resource_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_resolved_from_type() {
        let cases = [
            (STORAGE_BUCKET_TYPE, ResourceKind::StorageBucket),
            (IMAGE_REPOSITORY_TYPE, ResourceKind::ImageRepository),
            (ACCESS_ROLE_TYPE, ResourceKind::AccessRole),
            ("AWS::EC2::VPC", ResourceKind::Other),
        ];
        for (resource_type, kind) in cases {
            assert_eq!(Resource::new(resource_type, None).kind(), kind);
        }
    }

    #[test]
    fn test_deserialize_resolves_kind() {
        let resource: Resource = serde_json::from_str(
            r#"{"resource_type": "AWS::S3::Bucket", "physical_resource_id": "my-bucket"}"#,
        )
        .unwrap();
        assert_eq!(resource.kind(), ResourceKind::StorageBucket);
        assert_eq!(resource.physical_resource_id.as_deref(), Some("my-bucket"));
    }
}
