use firebird_hosting::model::{
    AllocatedEndpoint, Annotation, ApplicationBuilder, ParameterDefault, Protocol, Resource, ResourceBuilder,
    ResourceWithConnectionString,
};
use firebird_hosting::{
    ConfigError, FirebirdBuilderExt, FirebirdDatabaseResource, FirebirdOptions, FirebirdServerBuilderExt,
    FirebirdServerResource, HostingError,
};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

fn token() -> CancellationToken {
    CancellationToken::new()
}

async fn env_of(server: &FirebirdServerResource) -> BTreeMap<String, String> {
    server.annotations().environment_values(&token()).await.unwrap()
}

#[test]
fn adds_generated_password_parameter_with_user_secret_default() {
    let mut app = ApplicationBuilder::new();
    let firebird = app.add_firebird("firebird", FirebirdOptions::default()).unwrap();

    let password = firebird.resource().password_parameter();
    assert_eq!(password.name(), "firebird-password");
    assert!(password.is_secret());
    assert!(matches!(
        password.default(),
        Some(ParameterDefault::UserSecret { key, .. }) if key == "Parameters:firebird-password"
    ));
    let value = password.value().unwrap();
    assert!(value.len() >= 22);
    assert_eq!(password.value().unwrap(), value);
}

#[test]
fn container_with_defaults_adds_annotation_metadata() {
    let mut app = ApplicationBuilder::new();
    app.add_firebird("firebird", FirebirdOptions::default()).unwrap();
    let app = app.build();

    let servers = app.model().resources_of::<FirebirdServerResource>();
    assert_eq!(servers.len(), 1);
    let server = &servers[0];
    assert_eq!(server.name(), "firebird");

    let endpoints = server.annotations().endpoints();
    assert_eq!(endpoints.len(), 1);
    let endpoint = &endpoints[0];
    assert_eq!(endpoint.target_port, Some(3050));
    assert!(!endpoint.is_external);
    assert_eq!(endpoint.name, "tcp");
    assert_eq!(endpoint.port, None);
    assert_eq!(endpoint.protocol, Protocol::Tcp);
    assert_eq!(endpoint.transport, "tcp");
    assert_eq!(endpoint.uri_scheme, "tcp");

    let images: Vec<_> = server
        .annotations()
        .snapshot()
        .into_iter()
        .filter_map(|a| match a {
            Annotation::ContainerImage(c) => Some(c),
            _ => None,
        })
        .collect();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].image, "firebirdsql/firebird");
    assert_eq!(images[0].tag.as_deref(), Some("latest"));
    assert_eq!(images[0].registry.as_deref(), Some("docker.io"));
}

#[test]
fn explicit_port_is_the_host_port() {
    let mut app = ApplicationBuilder::new();
    let fb = app
        .add_firebird(
            "firebird",
            FirebirdOptions {
                port: Some(13050),
                ..FirebirdOptions::default()
            },
        )
        .unwrap();
    let endpoint = fb.resource().annotations().endpoint("tcp").unwrap();
    assert_eq!(endpoint.port, Some(13050));
    assert_eq!(endpoint.target_port, Some(3050));
}

#[tokio::test]
async fn generates_connection_string() {
    let mut app = ApplicationBuilder::new();
    let firebird = app
        .add_firebird("firebird", FirebirdOptions::default())
        .unwrap()
        .with_endpoint_config("tcp", |e| e.allocated = Some(AllocatedEndpoint::new("localhost", 3050)));

    let server = firebird.resource();
    let connection_string = server.get_connection_string(&token()).await.unwrap();

    assert_eq!(
        server.connection_string_expression().value_expression(),
        "Host={firebird.bindings.tcp.host};Port={firebird.bindings.tcp.port};Username=SYSDBA;Password={firebird-password.value}"
    );
    let password = server.password_parameter().value().unwrap();
    assert_eq!(
        connection_string,
        Some(format!("Host=localhost;Port=3050;Username=SYSDBA;Password={}", password))
    );
}

#[tokio::test]
async fn generates_connection_string_with_user_parameter() {
    let mut app = ApplicationBuilder::new();
    app.set_parameter_value("fb-user", "bob");
    app.set_parameter_value("fb-password", "P");
    let user = app.add_parameter("fb-user", false).unwrap();
    let password = app.add_parameter("fb-password", true).unwrap();
    let firebird = app
        .add_firebird(
            "firebird",
            FirebirdOptions {
                user: Some(user),
                password: Some(password),
                port: None,
            },
        )
        .unwrap()
        .with_endpoint_config("tcp", |e| e.allocated = Some(AllocatedEndpoint::new("db.local", 3051)));

    let cs = firebird.resource().get_connection_string(&token()).await.unwrap();
    assert_eq!(cs.as_deref(), Some("Host=db.local;Port=3051;Username=bob;Password=P"));
}

#[tokio::test]
async fn generates_connection_string_with_database() {
    let mut app = ApplicationBuilder::new();
    let fb = app
        .add_firebird("firebird", FirebirdOptions::default())
        .unwrap()
        .with_endpoint_config("tcp", |e| e.allocated = Some(AllocatedEndpoint::new("localhost", 3050)));
    fb.add_database(&mut app, "testDb", None).unwrap();
    let app = app.build();

    let server = app.model().resources_of::<FirebirdServerResource>().pop().unwrap();
    let server_cs = server.get_connection_string(&token()).await.unwrap().unwrap();
    let db = app.model().resources_of::<FirebirdDatabaseResource>().pop().unwrap();
    let db_cs = db.get_connection_string(&token()).await.unwrap();

    assert_eq!(
        db.connection_string_expression().value_expression(),
        "{firebird.connectionString};Database=testDb"
    );
    assert_eq!(db_cs, Some(format!("{};Database=testDb", server_cs)));
}

#[test]
fn throws_when_adding_identical_databases() {
    let mut app = ApplicationBuilder::new();
    let firebird = app.add_firebird("firebird", FirebirdOptions::default()).unwrap();
    firebird.add_database(&mut app, "db", None).unwrap();

    let err = firebird.add_database(&mut app, "db", None).unwrap_err();
    assert!(matches!(err, HostingError::Config(ConfigError::DuplicateDatabase { .. })));
    assert!(err.is_configuration_error());
    assert_eq!(app.resources().len(), 2);
}

#[tokio::test]
async fn same_database_name_on_different_servers_succeeds() {
    let mut app = ApplicationBuilder::new();
    let fb1 = app
        .add_firebird("firebird1", FirebirdOptions::default())
        .unwrap()
        .with_endpoint_config("tcp", |e| e.allocated = Some(AllocatedEndpoint::new("one", 3050)));
    let fb2 = app
        .add_firebird("firebird2", FirebirdOptions::default())
        .unwrap()
        .with_endpoint_config("tcp", |e| e.allocated = Some(AllocatedEndpoint::new("two", 3050)));

    let db1 = fb1.add_database(&mut app, "db", None).unwrap();
    let db2 = fb2.add_database(&mut app, "db", None).unwrap();

    let cs1 = db1.resource().get_connection_string(&token()).await.unwrap().unwrap();
    let cs2 = db2.resource().get_connection_string(&token()).await.unwrap().unwrap();
    assert!(cs1.starts_with("Host=one;"));
    assert!(cs2.starts_with("Host=two;"));
    assert!(cs1.ends_with(";Database=db") && cs2.ends_with(";Database=db"));
    assert_eq!(db1.resource().qualified_name(), "firebird1/db");
    assert_eq!(db2.resource().qualified_name(), "firebird2/db");
}

#[test]
fn adds_databases_with_different_names_to_single_server() {
    let mut app = ApplicationBuilder::new();
    let firebird = app.add_firebird("firebird", FirebirdOptions::default()).unwrap();

    let db1 = firebird.add_database(&mut app, "db1", Some("customers1")).unwrap();
    let db2 = firebird.add_database(&mut app, "db2", Some("customers2")).unwrap();

    assert_eq!(db1.resource().database_name(), "customers1");
    assert_eq!(db2.resource().database_name(), "customers2");
    assert_eq!(
        db1.resource().connection_string_expression().value_expression(),
        "{firebird.connectionString};Database=customers1"
    );
    assert_eq!(
        db2.resource().connection_string_expression().value_expression(),
        "{firebird.connectionString};Database=customers2"
    );
    assert_eq!(
        firebird.resource().databases(),
        vec![
            ("db1".to_string(), "customers1".to_string()),
            ("db2".to_string(), "customers2".to_string())
        ]
    );
}

#[test]
fn adds_same_database_name_to_multiple_servers() {
    let mut app = ApplicationBuilder::new();
    let db1 = app
        .add_firebird("firebird1", FirebirdOptions::default())
        .unwrap()
        .add_database(&mut app, "db1", Some("imports"))
        .unwrap();
    let db2 = app
        .add_firebird("firebird2", FirebirdOptions::default())
        .unwrap()
        .add_database(&mut app, "db2", Some("imports"))
        .unwrap();

    assert_eq!(db1.resource().database_name(), "imports");
    assert_eq!(db2.resource().database_name(), "imports");
    assert_eq!(
        db1.resource().connection_string_expression().value_expression(),
        "{firebird1.connectionString};Database=imports"
    );
    assert_eq!(
        db2.resource().connection_string_expression().value_expression(),
        "{firebird2.connectionString};Database=imports"
    );
}

#[test]
fn duplicate_server_name_is_rejected() {
    let mut app = ApplicationBuilder::new();
    app.add_firebird("firebird", FirebirdOptions::default()).unwrap();
    let err = app.add_firebird("firebird", FirebirdOptions::default()).unwrap_err();
    assert!(matches!(err, HostingError::DuplicateResource(_)));
}

#[test]
fn invalid_server_name_is_rejected() {
    let mut app = ApplicationBuilder::new();
    let err = app.add_firebird("fire_bird", FirebirdOptions::default()).unwrap_err();
    assert!(matches!(err, HostingError::Config(ConfigError::InvalidName { .. })));
    assert!(app.parameters().is_empty());
}

#[tokio::test]
async fn environment_helpers_set_single_variables() {
    type Apply = fn(ResourceBuilder<FirebirdServerResource>) -> ResourceBuilder<FirebirdServerResource>;
    let cases: Vec<(&str, &str, Apply)> = vec![
        ("FIREBIRD_USER", "Bob", |b| FirebirdServerBuilderExt::with_user(b, "Bob")),
        ("FIREBIRD_PASSWORD", "secret", |b| FirebirdServerBuilderExt::with_password(b, "secret")),
        ("FIREBIRD_ROOT_PASSWORD", "very_secret", |b| {
            FirebirdServerBuilderExt::with_root_password(b, "very_secret")
        }),
        ("TZ", "Europe/Berlin", |b| FirebirdServerBuilderExt::with_time_zone(b, "Europe/Berlin")),
        ("FIREBIRD_USE_LEGACY_AUTH", "true", |b| FirebirdServerBuilderExt::use_legacy_auth(b)),
    ];

    for (key, value, apply) in cases {
        let mut app = ApplicationBuilder::new();
        let fb = apply(app.add_firebird("firebird", FirebirdOptions::default()).unwrap());
        let env = env_of(fb.resource()).await;
        assert_eq!(env.len(), 1, "{}", key);
        assert_eq!(env.get(key).map(String::as_str), Some(value));
    }
}

#[tokio::test]
async fn firebird_database_env_tracks_latest_database() {
    let mut app = ApplicationBuilder::new();
    let fb = app.add_firebird("firebird", FirebirdOptions::default()).unwrap();
    fb.add_database(&mut app, "db1", Some("first")).unwrap();
    fb.add_database(&mut app, "db2", Some("second")).unwrap();

    let env = env_of(fb.resource()).await;
    assert_eq!(env["FIREBIRD_DATABASE"], "second");
}

#[tokio::test]
async fn publishing_without_allocated_endpoint_fails_fast() {
    let mut app = ApplicationBuilder::new();
    app.add_firebird("firebird", FirebirdOptions::default()).unwrap();
    let app = app.build();

    let err = app.publish_connection_strings(&token()).await.unwrap_err();
    assert!(matches!(err, HostingError::ConnectionStringUnavailable(ref name) if name == "firebird"));
    assert_eq!(
        err.to_string(),
        "ConnectionStringAvailableEvent was published for the 'firebird' resource but the connection string was null."
    );
}

#[tokio::test]
async fn publishing_with_allocated_endpoint_succeeds() {
    let mut app = ApplicationBuilder::new();
    let fb = app
        .add_firebird("firebird", FirebirdOptions::default())
        .unwrap()
        .with_endpoint_config("tcp", |e| e.allocated = Some(AllocatedEndpoint::new("localhost", 3050)));
    fb.add_database(&mut app, "testDb", None).unwrap();
    let app = app.build();

    assert_eq!(app.eventing().subscriber_count("firebird"), 1);
    assert_eq!(app.eventing().subscriber_count("firebird/testDb"), 1);
    app.publish_connection_strings(&token()).await.unwrap();
}

#[tokio::test]
async fn missing_user_parameter_value_surfaces_on_publish() {
    let mut app = ApplicationBuilder::new();
    let user = app.add_parameter("fb-user", false).unwrap();
    app.add_firebird(
        "firebird",
        FirebirdOptions {
            user: Some(user),
            ..FirebirdOptions::default()
        },
    )
    .unwrap()
    .with_endpoint_config("tcp", |e| e.allocated = Some(AllocatedEndpoint::new("localhost", 3050)));
    let app = app.build();

    let err = app.publish_connection_strings(&token()).await.unwrap_err();
    assert!(matches!(err, HostingError::MissingParameterValue(ref name) if name == "fb-user"));
}

#[tokio::test]
async fn redirect_annotation_delegates_connection_string() {
    let mut app = ApplicationBuilder::new();
    let target = app
        .add_firebird("primary", FirebirdOptions::default())
        .unwrap()
        .with_endpoint_config("tcp", |e| e.allocated = Some(AllocatedEndpoint::new("primary.local", 3050)));
    let redirected = app
        .add_firebird("replica", FirebirdOptions::default())
        .unwrap()
        .with_connection_string_redirect(target.resource().clone());
    let db = redirected.add_database(&mut app, "db", None).unwrap();

    let target_cs = target.resource().get_connection_string(&token()).await.unwrap().unwrap();
    let redirected_cs = redirected.resource().get_connection_string(&token()).await.unwrap().unwrap();
    assert_eq!(redirected_cs, target_cs);
    assert_eq!(
        redirected.resource().connection_string_expression().value_expression(),
        target.resource().connection_string_expression().value_expression()
    );

    let db_cs = db.resource().get_connection_string(&token()).await.unwrap().unwrap();
    assert_eq!(db_cs, format!("{};Database=db", target_cs));
}

#[tokio::test]
async fn cancelled_evaluation_returns_cancelled() {
    let mut app = ApplicationBuilder::new();
    let fb = app
        .add_firebird("firebird", FirebirdOptions::default())
        .unwrap()
        .with_endpoint_config("tcp", |e| e.allocated = Some(AllocatedEndpoint::new("localhost", 3050)));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = fb.resource().get_connection_string(&cancel).await.unwrap_err();
    assert!(matches!(err, HostingError::Cancelled));
}
