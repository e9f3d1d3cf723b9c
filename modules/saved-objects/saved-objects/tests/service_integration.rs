#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests of the client provider: wrapper chain order, exclusions and failures.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use saved_objects::{ClientProviderOptions, SavedObjectsClient, SavedObjectsSetup};
use saved_objects_sdk::{
    BaseOptions, BulkCreateObject, BulkCreateOptions, BulkGetObject, BulkResponse, ClientFactory,
    ClientFactoryParams, ClientWrapperFactory, ClientWrapperFactoryOptions, CreateOptions, DeleteOptions, FindOptions,
    FindResponse, NamespaceType, RepositoryFactory, RequestContext, SavedObject, SavedObjectsClientContract,
    SavedObjectsClientRef, SavedObjectsError, SavedObjectsServiceSetup, SavedObjectsType,
    UpdateOptions,
};
use serde_json::json;
use uuid::Uuid;

type Journal = Arc<Mutex<Vec<String>>>;

/// Records its label on every call before delegating.
struct LabelledClient {
    label: String,
    inner: SavedObjectsClientRef,
    journal: Journal,
}

impl LabelledClient {
    fn record(&self) {
        self.journal.lock().push(self.label.clone());
    }
}

#[async_trait]
impl SavedObjectsClientContract for LabelledClient {
    async fn create(
        &self,
        object_type: &str,
        attributes: serde_json::Value,
        options: CreateOptions,
    ) -> Result<SavedObject, SavedObjectsError> {
        self.record();
        self.inner.create(object_type, attributes, options).await
    }

    async fn bulk_create(
        &self,
        objects: Vec<BulkCreateObject>,
        options: BulkCreateOptions,
    ) -> Result<BulkResponse, SavedObjectsError> {
        self.record();
        self.inner.bulk_create(objects, options).await
    }

    async fn get(
        &self,
        object_type: &str,
        id: &str,
        options: BaseOptions,
    ) -> Result<SavedObject, SavedObjectsError> {
        self.record();
        self.inner.get(object_type, id, options).await
    }

    async fn bulk_get(
        &self,
        objects: Vec<BulkGetObject>,
        options: BaseOptions,
    ) -> Result<BulkResponse, SavedObjectsError> {
        self.record();
        self.inner.bulk_get(objects, options).await
    }

    async fn find(&self, options: FindOptions) -> Result<FindResponse, SavedObjectsError> {
        self.record();
        self.inner.find(options).await
    }

    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: serde_json::Value,
        options: UpdateOptions,
    ) -> Result<SavedObject, SavedObjectsError> {
        self.record();
        self.inner.update(object_type, id, attributes, options).await
    }

    async fn delete(
        &self,
        object_type: &str,
        id: &str,
        options: DeleteOptions,
    ) -> Result<(), SavedObjectsError> {
        self.record();
        self.inner.delete(object_type, id, options).await
    }
}

fn labelled(label: &str, built: &Journal, calls: &Journal) -> ClientWrapperFactory {
    let label = label.to_owned();
    let built = Arc::clone(built);
    let calls = Arc::clone(calls);
    Arc::new(
        move |options: ClientWrapperFactoryOptions| -> Result<SavedObjectsClientRef, SavedObjectsError> {
            built.lock().push(label.clone());
            Ok(Arc::new(LabelledClient {
                label: label.clone(),
                inner: options.client,
                journal: Arc::clone(&calls),
            }))
        },
    )
}

fn failing(built: &Journal) -> ClientWrapperFactory {
    let built = Arc::clone(built);
    Arc::new(
        move |_options: ClientWrapperFactoryOptions| -> Result<SavedObjectsClientRef, SavedObjectsError> {
            built.lock().push("failing".to_owned());
            Err(SavedObjectsError::General {
                message: "wrapper unavailable".to_owned(),
            })
        },
    )
}

fn request() -> RequestContext {
    RequestContext::builder()
        .tenant_id(Uuid::new_v4())
        .subject_id(Uuid::new_v4())
        .username("elastic")
        .build()
}

fn setup_with_types() -> SavedObjectsSetup {
    let mut setup = SavedObjectsSetup::default();
    setup
        .register_type(SavedObjectsType::new("dashboard", NamespaceType::Single))
        .unwrap();
    setup
        .register_type(SavedObjectsType::new("alert", NamespaceType::Single).hidden())
        .unwrap();
    setup
}

#[tokio::test]
async fn lowest_priority_wrapper_is_innermost() {
    let built = Journal::default();
    let calls = Journal::default();
    let mut setup = setup_with_types();
    setup
        .add_client_wrapper(10, "outer", labelled("outer", &built, &calls))
        .unwrap();
    setup
        .add_client_wrapper(1, "inner", labelled("inner", &built, &calls))
        .unwrap();
    setup
        .add_client_wrapper(5, "middle", labelled("middle", &built, &calls))
        .unwrap();

    let start = setup.start();
    let client = start
        .get_scoped_client(&request(), &ClientProviderOptions::default())
        .unwrap();

    assert_eq!(*built.lock(), vec!["inner", "middle", "outer"]);

    client
        .create("dashboard", json!({"title": "Sales"}), CreateOptions::default())
        .await
        .unwrap();
    assert_eq!(*calls.lock(), vec!["outer", "middle", "inner"]);
}

#[tokio::test]
async fn excluded_wrappers_are_skipped() {
    let built = Journal::default();
    let calls = Journal::default();
    let mut setup = setup_with_types();
    setup
        .add_client_wrapper(10, "security", labelled("security", &built, &calls))
        .unwrap();
    setup
        .add_client_wrapper(1, "spaces", labelled("spaces", &built, &calls))
        .unwrap();

    let start = setup.start();
    let client = start
        .get_scoped_client(
            &request(),
            &ClientProviderOptions {
                excluded_wrappers: vec!["security".to_owned()],
                ..Default::default()
            },
        )
        .unwrap();

    let err = client
        .get("dashboard", "missing", BaseOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(*built.lock(), vec!["spaces"]);
    assert_eq!(*calls.lock(), vec!["spaces"]);
}

#[test]
fn failing_wrapper_aborts_the_chain() {
    let built = Journal::default();
    let calls = Journal::default();
    let mut setup = setup_with_types();
    setup
        .add_client_wrapper(10, "outer", labelled("outer", &built, &calls))
        .unwrap();
    setup.add_client_wrapper(5, "failing", failing(&built)).unwrap();
    setup
        .add_client_wrapper(1, "inner", labelled("inner", &built, &calls))
        .unwrap();

    let start = setup.start();
    let Err(err) = start.get_scoped_client(&request(), &ClientProviderOptions::default()) else {
        panic!("expected the failing wrapper to abort the chain");
    };

    assert!(err.is_general());
    assert_eq!(*built.lock(), vec!["inner", "failing"]);
}

#[tokio::test]
async fn hidden_types_flow_to_the_client_factory() {
    let start = setup_with_types().start();
    let request = request();

    let plain = start
        .get_scoped_client(&request, &ClientProviderOptions::default())
        .unwrap();
    let err = plain
        .create("alert", json!({}), CreateOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SavedObjectsError::UnsupportedType { .. }));

    let with_alerts = start
        .get_scoped_client(
            &request,
            &ClientProviderOptions {
                included_hidden_types: vec!["alert".to_owned()],
                ..Default::default()
            },
        )
        .unwrap();
    assert!(
        with_alerts
            .create("alert", json!({}), CreateOptions::default())
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn custom_client_factory_replaces_the_default() {
    let mut setup = setup_with_types();
    setup
        .set_client_factory_provider(Box::new(|repositories: Arc<dyn RepositoryFactory>| -> ClientFactory {
            Arc::new(
                move |params: ClientFactoryParams| -> Result<SavedObjectsClientRef, SavedObjectsError> {
                    let repository =
                        repositories.create_internal_repository(&params.included_hidden_types)?;
                    Ok(Arc::new(SavedObjectsClient::new(repository)))
                },
            )
        }))
        .unwrap();
    let start = setup.start();

    let scoped = start
        .get_scoped_client(&request(), &ClientProviderOptions::default())
        .unwrap();
    let created = scoped
        .create("dashboard", json!({}), CreateOptions::default())
        .await
        .unwrap();

    assert_eq!(created.tenant_id, Uuid::nil());
    let other = start.create_scoped_repository(&request(), &[]).unwrap();
    assert!(
        other
            .get("dashboard", &created.id, BaseOptions::default())
            .await
            .unwrap_err()
            .is_not_found()
    );
}
