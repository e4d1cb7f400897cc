// crates.io
use httpmock::prelude::*;
// self
use oauth2_idp::{
	_preludet::*,
	auth::{AccessToken, ProviderId},
	error::ConfigError,
	provider::{GenericProvider, ProfileFields, ProviderConfig},
};

const CLIENT_ID: &str = "client-resource";

fn build_provider(server: &MockServer, user_info: bool) -> GenericProvider {
	let provider_id = ProviderId::new("mock-resource")
		.expect("Provider identifier should be valid for resource tests.");
	let builder = GenericProvider::builder(provider_id)
		.authorization_endpoint(
			Url::parse(&server.url("/authorize")).expect("Authorization endpoint should parse."),
		)
		.token_endpoint(Url::parse(&server.url("/token")).expect("Token endpoint should parse."))
		.profile_fields(ProfileFields { picture: "avatar_url".into(), ..Default::default() });
	let builder = if user_info {
		builder.user_info_endpoint(
			Url::parse(&server.url("/user")).expect("User-info endpoint should parse."),
		)
	} else {
		builder
	};

	builder.build().expect("Generic provider should build.")
}

fn build_client(server: &MockServer, user_info: bool) -> ReqwestTestClient {
	let config = ProviderConfig::builder(CLIENT_ID)
		.client_secret("secret-resource")
		.build()
		.expect("Provider config should build.");

	build_reqwest_test_client(build_provider(server, user_info), config)
}

fn bearer_token(value: &str) -> AccessToken {
	let mut payload = JsonMap::new();

	payload.insert("access_token".into(), value.into());

	AccessToken::from_payload(payload, "uid", OffsetDateTime::now_utc())
		.expect("Token fixture should parse.")
}

#[tokio::test]
async fn resource_failures_report_the_last_body_line() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, true);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me");
			then.status(429).body("line1\nrate limit exceeded");
		})
		.await;
	let err = client
		.fetch_authenticated_resource(&server.url("/me"), &BTreeMap::new())
		.await
		.expect_err("Rate-limited fetches must fail.");

	mock.assert_async().await;

	assert!(matches!(
		err,
		Error::ResourceFetchError { ref message, status: Some(429) }
			if message == "rate limit exceeded"
	));
}

#[tokio::test]
async fn unreachable_resources_report_fetch_errors() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, true);
	let err = client
		.fetch_authenticated_resource("http://127.0.0.1:9/me", &BTreeMap::new())
		.await
		.expect_err("Connection failures must surface.");

	assert!(matches!(
		err,
		Error::ResourceFetchError { ref message, status: None } if !message.is_empty()
	));
}

#[tokio::test]
async fn resources_decode_json_and_forward_headers() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, true);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/me")
				.query_param("fields", "id,name")
				.header("authorization", "Bearer abc123")
				.header("accept", "application/json");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":7,\"name\":\"Ada\"}");
		})
		.await;
	let headers = BTreeMap::from_iter([
		("Authorization".to_owned(), "Bearer abc123".to_owned()),
		("X-Optional".to_owned(), String::new()),
	]);
	let document = client
		.fetch_authenticated_resource(&server.url("/me?fields=id,name"), &headers)
		.await
		.expect("Resource fetch should succeed.");

	mock.assert_async().await;

	assert_eq!(document["id"], JsonValue::from(7));
	assert_eq!(document["name"], JsonValue::from("Ada"));
}

#[tokio::test]
async fn malformed_resource_bodies_and_urls_are_rejected() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, true);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/broken");
			then.status(200).body("<html>not json</html>");
		})
		.await;
	let err = client
		.fetch_authenticated_resource(&server.url("/broken"), &BTreeMap::new())
		.await
		.expect_err("Non-JSON bodies must fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::MalformedResourceResponse { .. }));

	let err = client
		.fetch_authenticated_resource("not a url", &BTreeMap::new())
		.await
		.expect_err("Invalid URLs must fail.");

	assert!(matches!(err, Error::Config(ConfigError::InvalidUrl { .. })));
}

#[tokio::test]
async fn user_profiles_are_fetched_with_the_bearer_token() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let client = build_client(&server, true);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").form_urlencoded_tuple("code", "code-profile");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"profile-token\",\"uid\":\"u-1\"}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user").header("authorization", "Bearer profile-token");
			then.status(200).header("content-type", "application/json").body(
				"{\"id\":\"octo-1\",\"login\":\"octocat\",\"name\":\"Mona\",\"email\":\"mona@example.com\",\"avatar_url\":\"https://cdn.example.com/mona.png\"}",
			);
		})
		.await;
	let token = client.exchange_code("code-profile", None).await?;
	let profile = client.fetch_user_profile(&token).await?;

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	assert_eq!(profile.provider.as_ref(), "mock-resource");
	assert_eq!(profile.uid, "octo-1");
	assert_eq!(profile.nickname.as_deref(), Some("octocat"));
	assert_eq!(profile.email.as_deref(), Some("mona@example.com"));
	assert_eq!(profile.image_url.as_deref(), Some("https://cdn.example.com/mona.png"));

	Ok(())
}

#[tokio::test]
async fn profiles_without_user_info_endpoint_skip_the_network() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, false);
	let mock = server
		.mock_async(|when, then| {
			when.path("/user");
			then.status(200).body("{}");
		})
		.await;
	let err = client
		.fetch_user_profile(&bearer_token("abc123"))
		.await
		.expect_err("Providers without a user-info endpoint must fail.");

	assert!(matches!(err, Error::Config(ConfigError::MissingUserInfoEndpoint { .. })));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn profile_errors_surface_as_resource_failures() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, true);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user");
			then.status(401).body("{\"message\":\"Bad credentials\"}\n");
		})
		.await;
	let err = client
		.fetch_user_profile(&bearer_token("revoked"))
		.await
		.expect_err("Unauthorized profile fetches must fail.");

	mock.assert_async().await;

	assert!(matches!(
		err,
		Error::ResourceFetchError { ref message, status: Some(401) }
			if message == "{\"message\":\"Bad credentials\"}"
	));
}
