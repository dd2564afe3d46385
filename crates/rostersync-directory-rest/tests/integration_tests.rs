//! Integration tests for the REST directory client against a mock server.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rostersync_directory::{DirectoryClient, DirectoryError, GroupId, GroupSelector, ScopeId};
use rostersync_directory_rest::{RestDirectoryClient, RestDirectoryConfig};

fn client_for(server: &MockServer) -> RestDirectoryClient {
    let config = RestDirectoryConfig::new(server.uri()).with_token("test-token");
    RestDirectoryClient::new(config).unwrap()
}

fn scope() -> ScopeId {
    ScopeId::new("s1")
}

#[tokio::test]
async fn lists_scopes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopes"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": "s1"}, {"id": "s2"}])),
        )
        .mount(&server)
        .await;

    let scopes = client_for(&server).list_scopes().await.unwrap();
    assert_eq!(scopes, vec![ScopeId::new("s1"), ScopeId::new("s2")]);
}

#[tokio::test]
async fn resolves_group_by_id_with_point_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopes/s1/groups/role-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "role-1", "name": "Members"})),
        )
        .mount(&server)
        .await;

    let group = client_for(&server)
        .resolve_group(&scope(), &GroupSelector::by_id(GroupId::new("role-1")))
        .await
        .unwrap();
    assert_eq!(group, GroupId::new("role-1"));
}

#[tokio::test]
async fn unknown_group_id_is_group_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopes/s1/groups/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .resolve_group(&scope(), &GroupSelector::by_id(GroupId::new("missing")))
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::GroupNotFound { .. }));
}

#[tokio::test]
async fn resolves_group_by_name_from_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopes/s1/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "role-1", "name": "Admins"},
            {"id": "role-2", "name": "Members"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let group = client
        .resolve_group(&scope(), &GroupSelector::by_name("Members"))
        .await
        .unwrap();
    assert_eq!(group, GroupId::new("role-2"));

    let err = client
        .resolve_group(&scope(), &GroupSelector::by_name("Nobody"))
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::GroupNotFound { .. }));
}

#[tokio::test]
async fn lists_members_with_group_holdings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopes/s1/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "123", "groups": ["role-1"]},
            {"id": "456"}
        ])))
        .mount(&server)
        .await;

    let members = client_for(&server).list_members(&scope()).await.unwrap();
    assert_eq!(members.len(), 2);
    assert!(members[0].has_group(&GroupId::new("role-1")));
    assert!(members[1].groups.is_empty());
}

#[tokio::test]
async fn absent_member_fetches_as_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopes/s1/members/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let member = client_for(&server)
        .fetch_member(&scope(), &"999".parse().unwrap())
        .await
        .unwrap();
    assert!(member.is_none());
}

#[tokio::test]
async fn probes_group_membership_with_fresh_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopes/s1/members/123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "123", "groups": ["role-1"]})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let user = "123".parse().unwrap();

    assert!(client
        .member_has_group(&scope(), &user, &GroupId::new("role-1"))
        .await
        .unwrap());
    assert!(!client
        .member_has_group(&scope(), &user, &GroupId::new("role-2"))
        .await
        .unwrap());
}

#[tokio::test]
async fn grant_sends_put_with_audit_reason() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/scopes/s1/members/123/groups/role-1"))
        .and(body_json(json!({"reason": "signed (roster sync)"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .grant_group(
            &scope(),
            &"123".parse().unwrap(),
            &GroupId::new("role-1"),
            "signed (roster sync)",
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn revoke_sends_delete_with_audit_reason() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/scopes/s1/members/123/groups/role-1"))
        .and(body_json(json!({"reason": "not signed (roster sync)"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .revoke_group(
            &scope(),
            &"123".parse().unwrap(),
            &GroupId::new("role-1"),
            "not signed (roster sync)",
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn ban_sends_put_to_bans_resource() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/scopes/s1/bans/456"))
        .and(body_json(json!({"reason": "agreement not signed (roster sync)"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .ban_member(
            &scope(),
            &"456".parse().unwrap(),
            "agreement not signed (roster sync)",
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn maps_auth_statuses_to_permanent_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopes/s1/members"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/scopes/s1/bans/123"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client.list_members(&scope()).await.unwrap_err();
    assert!(matches!(err, DirectoryError::AuthenticationFailed));
    assert!(err.is_permanent());

    let err = client
        .ban_member(&scope(), &"123".parse().unwrap(), "reason")
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::PermissionDenied { .. }));
}

#[tokio::test]
async fn maps_server_errors_to_transient_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopes/s1/members"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).list_members(&scope()).await.unwrap_err();
    assert!(matches!(err, DirectoryError::Unavailable { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scopes/s1/members"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_members(&scope()).await.unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidResponse { .. }));
}
