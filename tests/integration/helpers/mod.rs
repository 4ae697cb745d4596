// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::TestServer;
use junfan::config::settings::AuthSettings;
use junfan::domain::services::key_service::KeyService;
use junfan::presentation::routes;
use std::sync::Arc;


use mock_repository::MockApiKeyRepository;

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub service: Arc<KeyService>,
    pub repo: Arc<MockApiKeyRepository>,
}

/// Full router wired to an in-memory key store.
pub fn create_test_app() -> TestApp {
    let repo = Arc::new(MockApiKeyRepository::new());
    let service = Arc::new(KeyService::new(repo.clone(), &test_auth_settings()));
    let app = routes::routes(service.clone());
    let server = TestServer::new(app).expect("Failed to start test server");

    TestApp {
        server,
        service,
        repo,
    }
}

pub fn test_auth_settings() -> AuthSettings {
    AuthSettings {
        key_namespace: "junfan".to_string(),
        lookup_pepper: "integration-pepper".to_string(),
    }
}
