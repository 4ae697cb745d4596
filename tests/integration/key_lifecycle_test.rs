// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::mock_repository::MockApiKeyRepository;
use crate::helpers::test_auth_settings;
use junfan::domain::models::api_key::{KeyEnvironment, SECRET_MASK_LEN};
use junfan::domain::services::key_service::{KeyService, KeyServiceError};
use std::sync::Arc;
use uuid::Uuid;

fn service_with_repo() -> (Arc<MockApiKeyRepository>, KeyService) {
    let repo = Arc::new(MockApiKeyRepository::new());
    let service = KeyService::new(repo.clone(), &test_auth_settings());
    (repo, service)
}

#[tokio::test]
async fn test_full_key_lifecycle() {
    let (repo, service) = service_with_repo();

    // Mint
    let key = service
        .mint("production backend", KeyEnvironment::Production)
        .await
        .unwrap();
    assert!(key.secret.starts_with("junfan-prod-"));
    assert_eq!(key.usage_count, 0);

    // Listing masks, reveal returns the plaintext
    let views = service.list(None).await.unwrap();
    assert_eq!(views.len(), 1);
    assert!(views[0].masked_secret.ends_with(&"*".repeat(SECRET_MASK_LEN)));
    assert_ne!(views[0].masked_secret, key.secret);
    assert_eq!(service.reveal(key.id).await.unwrap(), key.secret);

    // Validate counts usage
    for expected in 1..=3 {
        let validated = service.validate(&key.secret).await.unwrap();
        assert_eq!(validated.usage_count, expected);
    }
    assert_eq!(repo.usage_of(key.id), Some(3));

    // Revoke kills the secret immediately
    service.revoke(key.id).await.unwrap();
    assert_eq!(repo.len(), 0);
    assert!(matches!(
        service.validate(&key.secret).await,
        Err(KeyServiceError::InvalidKey)
    ));
    assert!(matches!(
        service.reveal(key.id).await,
        Err(KeyServiceError::NotFound)
    ));

    // Second revoke reports the benign NotFound
    assert!(matches!(
        service.revoke(key.id).await,
        Err(KeyServiceError::NotFound)
    ));
}

#[tokio::test]
async fn test_listing_order_and_filter() {
    let (_repo, service) = service_with_repo();

    let a = service.mint("first", KeyEnvironment::Development).await.unwrap();
    let b = service.mint("second one", KeyEnvironment::Production).await.unwrap();
    let c = service.mint("third", KeyEnvironment::Development).await.unwrap();

    let views = service.list(None).await.unwrap();
    let ids: Vec<Uuid> = views.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![c.id, b.id, a.id]);

    let filtered = service.list(Some("SECOND")).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, b.id);

    let none = service.list(Some("missing")).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_validate_never_panics_on_garbage() {
    let (_repo, service) = service_with_repo();
    service.mint("real key", KeyEnvironment::Development).await.unwrap();

    let garbage = [
        "",
        " ",
        "\t\n",
        "junfan-dev-",
        "junfan-prod-00000000-0000-0000-0000-000000000000",
        "密钥",
        "🔑🔑🔑",
        "junfan-dev-ffffffff-ffff-ffff-ffff-ffffffffffff extra",
    ];
    for input in garbage {
        assert!(matches!(
            service.validate(input).await,
            Err(KeyServiceError::InvalidKey)
        ));
    }
}

#[tokio::test]
async fn test_many_concurrent_validations_lose_no_increment() {
    let (repo, service) = service_with_repo();
    let service = Arc::new(service);
    let key = service
        .mint("hot key", KeyEnvironment::Production)
        .await
        .unwrap();

    let calls = (0..10).map(|_| {
        let service = service.clone();
        let secret = key.secret.clone();
        tokio::spawn(async move { service.validate(&secret).await })
    });

    let results = futures::future::join_all(calls).await;
    for result in results {
        assert!(result.unwrap().is_ok());
    }
    assert_eq!(repo.usage_of(key.id), Some(10));
}

#[tokio::test]
async fn test_revoke_only_targets_one_key() {
    let (repo, service) = service_with_repo();

    let keep = service.mint("keeper", KeyEnvironment::Development).await.unwrap();
    let drop = service.mint("dropper", KeyEnvironment::Development).await.unwrap();

    service.revoke(drop.id).await.unwrap();

    assert_eq!(repo.len(), 1);
    assert!(service.validate(&keep.secret).await.is_ok());
    assert!(matches!(
        service.validate(&drop.secret).await,
        Err(KeyServiceError::InvalidKey)
    ));
}
