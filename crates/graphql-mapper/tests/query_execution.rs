//! Integration tests executing queries against built schemas.
//!
//! Covers default property resolution over JSON values and model
//! instances, model relations, callable resolvers and interface dispatch
//! by model.

use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, FieldValue};
use graphql_mapper::{
    Field, InterfaceDispatchers, InterfaceType, ModelInstance, ModelRef, ResolveConfig, Resolver,
    SchemaContainer, SchemaFactory, SchemaFactoryConfig, StaticLoader, Type,
};
use serde_json::json;

// =============================================================================
// Domain models
// =============================================================================

struct PostRecord {
    id: &'static str,
    title: &'static str,
}

impl ModelInstance for PostRecord {
    fn model(&self) -> &str {
        "PostModel"
    }

    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "title" => Some(Value::from(self.title)),
            _ => None,
        }
    }

    fn relation(&self, name: &str) -> Option<ModelRef> {
        (name == "author").then(|| Arc::new(UserRecord { id: "u1", name: "Ada" }) as ModelRef)
    }
}

struct UserRecord {
    id: &'static str,
    name: &'static str,
}

impl ModelInstance for UserRecord {
    fn model(&self) -> &str {
        "UserModel"
    }

    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "name" => Some(Value::from(self.name)),
            _ => None,
        }
    }

    fn relations(&self, name: &str) -> Option<Vec<ModelRef>> {
        (name == "posts").then(|| {
            vec![
                Arc::new(PostRecord { id: "1", title: "Hello" }) as ModelRef,
                Arc::new(PostRecord { id: "2", title: "Again" }) as ModelRef,
            ]
        })
    }
}

struct AuditEntry;

impl ModelInstance for AuditEntry {
    fn model(&self) -> &str {
        "AuditModel"
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn callable<F>(f: F) -> ResolveConfig
where
    F: Fn() -> Value + Send + Sync + 'static,
{
    let f = Arc::new(f);
    ResolveConfig::callable(Resolver::new(move |_| {
        let f = Arc::clone(&f);
        FieldFuture::new(async move { Ok(Some(f())) })
    }))
}

/// Resolves through the `Node` dispatcher registered as schema data.
fn node_resolver(instance: fn() -> ModelRef) -> ResolveConfig {
    ResolveConfig::callable(Resolver::new(move |ctx| {
        FieldFuture::new(async move {
            let dispatchers = ctx.data::<InterfaceDispatchers>()?;
            Ok(dispatchers.dispatch("Node", instance()))
        })
    }))
}

/// Returns model instances as they are, leaving dispatch to the schema.
fn models<F>(f: F) -> ResolveConfig
where
    F: Fn() -> FieldValue<'static> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    ResolveConfig::callable(Resolver::new(move |_| {
        let f = Arc::clone(&f);
        FieldFuture::new(async move { Ok(Some(f())) })
    }))
}

fn post(id: &'static str, title: &'static str) -> FieldValue<'static> {
    FieldValue::owned_any(Arc::new(PostRecord { id, title }) as ModelRef)
}

fn blog(query: Type) -> SchemaContainer {
    let mut container = SchemaContainer::new();
    container
        .add_interface(InterfaceType::new("Node").field(Field::new("id").with_type("ID!")))
        .unwrap();
    container
        .add_type(
            Type::object("Post")
                .with_model("PostModel")
                .implements("Node")
                .field(Field::new("id").with_type("ID!"))
                .field(Field::new("title").with_type("String"))
                .field(Field::new("author").with_type("User")),
        )
        .unwrap();
    container
        .add_type(
            Type::object("User")
                .with_model("UserModel")
                .implements("Node")
                .field(Field::new("id").with_type("ID!"))
                .field(Field::new("name").with_type("String"))
                .field(Field::new("posts").with_type("[Post]")),
        )
        .unwrap();
    container.set_query_schema(query);
    container
}

fn build(container: SchemaContainer) -> graphql_mapper::ExecutableSchema {
    SchemaFactory::new(StaticLoader::new(container), SchemaFactoryConfig::default())
        .create_schema()
        .unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_default_resolvers_read_json_values() {
    let posts = callable(|| {
        Value::from_json(json!([
            {
                "id": "1",
                "title": "Hello",
                "author": { "id": "u1", "name": "Ada", "posts": [{ "id": "1", "title": "Hello" }] }
            }
        ]))
        .unwrap()
    });
    let schema = build(blog(
        Type::object("Query").field(Field::new("posts").with_type("[Post]").resolve(posts)),
    ));

    let response = schema
        .schema()
        .execute("{ posts { id title author { name posts { title } } } }")
        .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({
            "posts": [{
                "id": "1",
                "title": "Hello",
                "author": { "name": "Ada", "posts": [{ "title": "Hello" }] }
            }]
        })
    );
}

#[tokio::test]
async fn test_property_handler_reads_renamed_property() {
    let mut container = blog(Type::object("Query").field(
        Field::new("post").with_type("Post").resolve(callable(|| {
            Value::from_json(json!({ "id": "7", "headline": "Renamed" })).unwrap()
        })),
    ));
    let post = container.get_type_mut("Post").unwrap();
    post.fields.retain(|f| f.name != "title");
    post.fields.push(
        Field::new("title")
            .with_type("String")
            .resolve(ResolveConfig::handler("property").option("property", "headline")),
    );

    let schema = SchemaFactory::new(StaticLoader::new(container), SchemaFactoryConfig::default())
        .with_resolver(graphql_mapper::resolvers::PropertyResolver)
        .create_schema()
        .unwrap();

    let response = schema.schema().execute("{ post { id title } }").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "post": { "id": "7", "title": "Renamed" } })
    );
}

#[tokio::test]
async fn test_interface_dispatch_by_model() {
    let schema = build(blog(
        Type::object("Query")
            .field(
                Field::new("node")
                    .with_type("Node")
                    .resolve(node_resolver(|| Arc::new(PostRecord { id: "1", title: "Hello" }))),
            )
            .field(
                Field::new("audit")
                    .with_type("Node")
                    .resolve(node_resolver(|| Arc::new(AuditEntry))),
            ),
    ));

    let response = schema
        .schema()
        .execute("{ node { id ... on Post { title } } audit { id } }")
        .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "node": { "id": "1", "title": "Hello" }, "audit": null })
    );
}

#[tokio::test]
async fn test_interface_fields_dispatch_returned_models() {
    let schema = build(blog(
        Type::object("Query")
            .field(
                Field::new("node")
                    .with_type("Node")
                    .resolve(models(|| post("1", "Hello"))),
            )
            .field(
                Field::new("audit")
                    .with_type("Node")
                    .resolve(models(|| FieldValue::owned_any(Arc::new(AuditEntry) as ModelRef))),
            )
            .field(Field::new("feed").with_type("[Node]").resolve(models(|| {
                FieldValue::list([
                    post("2", "Again"),
                    FieldValue::owned_any(Arc::new(AuditEntry) as ModelRef),
                    FieldValue::owned_any(Arc::new(UserRecord { id: "u1", name: "Ada" }) as ModelRef),
                ])
            }))),
    ));

    let response = schema
        .schema()
        .execute(
            "{ node { id ... on Post { title } } audit { id } \
             feed { __typename id ... on User { name } } }",
        )
        .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({
            "node": { "id": "1", "title": "Hello" },
            "audit": null,
            "feed": [
                { "__typename": "Post", "id": "2" },
                null,
                { "__typename": "User", "id": "u1", "name": "Ada" }
            ]
        })
    );
}

#[tokio::test]
async fn test_default_resolvers_walk_model_relations() {
    let schema = build(blog(
        Type::object("Query").field(
            Field::new("post")
                .with_type("Post")
                .resolve(models(|| post("1", "Hello"))),
        ),
    ));

    let response = schema
        .schema()
        .execute("{ post { title author { name posts { id title } } } }")
        .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({
            "post": {
                "title": "Hello",
                "author": {
                    "name": "Ada",
                    "posts": [{ "id": "1", "title": "Hello" }, { "id": "2", "title": "Again" }]
                }
            }
        })
    );
}

#[test]
fn test_dispatcher_mapping_follows_models() {
    let schema = build(blog(
        Type::object("Query").field(Field::new("node").with_type("Node")),
    ));

    let dispatcher = schema.dispatcher("Node").unwrap();
    let post = PostRecord { id: "1", title: "Hello" };

    assert_eq!(dispatcher.type_name_for(&post), Some("Post"));
    assert_eq!(dispatcher.resolve(&post).unwrap().unwrap().name(), "Post");
    assert!(dispatcher.resolve(&AuditEntry).unwrap().is_none());

    let node = schema.registry().get_type("Node").unwrap();
    assert!(node.dispatcher().is_some());
}

#[test]
fn test_introspection_can_be_disabled() {
    let config = SchemaFactoryConfig {
        introspection_enabled: false,
        ..SchemaFactoryConfig::default()
    };
    let schema = SchemaFactory::new(
        StaticLoader::new(blog(
            Type::object("Query").field(Field::new("node").with_type("Node")),
        )),
        config,
    )
    .create_schema()
    .unwrap();

    let response = tokio_test::block_on(
        schema
            .schema()
            .execute("{ __schema { queryType { name } } }"),
    );
    assert!(!response.errors.is_empty());
}

#[test]
fn test_depth_limit_applies() {
    let config = SchemaFactoryConfig {
        max_depth: 2,
        ..SchemaFactoryConfig::default()
    };
    let schema = SchemaFactory::new(
        StaticLoader::new(blog(
            Type::object("Query").field(Field::new("posts").with_type("[Post]")),
        )),
        config,
    )
    .create_schema()
    .unwrap();

    let response = tokio_test::block_on(
        schema
            .schema()
            .execute("{ posts { author { posts { title } } } }"),
    );
    assert!(!response.errors.is_empty());
}
