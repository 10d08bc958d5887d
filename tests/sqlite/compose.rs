use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use canopy::prelude::*;

use crate::common::helpers::{Search, Viewer, names, owned_by_viewer, search};
use crate::common::{categories, setup_db};

type Options = Composer<SqliteQuery, Search, Viewer>;

fn composer(
    conn: &rusqlite::Connection,
    config: SetupConfig<Search, Viewer, SQLiteValue>,
) -> Options {
    let mut composer = Composer::new(TableRef::new("categories"));
    composer.setup(&categories(conn), config).unwrap();
    composer
}

#[test]
fn setup_runs_once() {
    let conn = setup_db();
    let schema = categories(&conn);
    let mut composer: Options = Composer::new(TableRef::new("categories"));
    composer
        .setup(&schema, SetupConfig::new().criteria(search))
        .unwrap();

    let before: Vec<String> = composer.options().iter().map(|o| o.name().to_string()).collect();
    let seed = composer.bucket(Phase::Seed).to_vec();
    let all = composer.bucket(Phase::All).to_vec();

    composer
        .setup(&schema, SetupConfig::new().permission(owned_by_viewer))
        .unwrap();

    let again: Vec<String> = composer.options().iter().map(|o| o.name().to_string()).collect();
    assert_eq!(before, again);
    assert_eq!(composer.bucket(Phase::Seed), seed.as_slice());
    assert_eq!(composer.bucket(Phase::All), all.as_slice());
    assert!(composer.is_set_up());
}

#[test]
fn option_on_seed_and_all_runs_once_per_configure() {
    let conn = setup_db();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut composer: Options = Composer::new(TableRef::new("categories"));
    composer
        .register(QueryOption::new(
            "count",
            [Phase::Seed, Phase::All],
            move |_: &mut SqliteQuery, _: &Search, _: &Viewer| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        ))
        .unwrap();
    composer.setup(&categories(&conn), SetupConfig::new()).unwrap();

    let mut query = composer.query();
    composer
        .configure(&mut query, &Search::default(), &Viewer::default(), Phase::Seed)
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    composer
        .configure(&mut query, &Search::default(), &Viewer::default(), Phase::Expansion)
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn first_failing_option_aborts_configure() {
    let conn = setup_db();
    let later = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&later);

    let mut composer: Options = Composer::new(TableRef::new("categories"));
    composer
        .register(QueryOption::new(
            "reject",
            Phase::Seed,
            |_: &mut SqliteQuery, _: &Search, _: &Viewer| {
                Err(CanopyError::Other("rejected".into()))
            },
        ))
        .unwrap();
    composer
        .register(QueryOption::new(
            "after",
            Phase::Seed,
            move |_: &mut SqliteQuery, _: &Search, _: &Viewer| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        ))
        .unwrap();
    composer.setup(&categories(&conn), SetupConfig::new()).unwrap();

    let err = composer
        .select(&Search::default(), &Viewer::default())
        .unwrap_err();
    assert!(matches!(err, CanopyError::Other(ref message) if message == "rejected"));
    assert_eq!(later.load(Ordering::SeqCst), 0);
}

#[test]
fn register_after_setup_is_rejected() {
    let conn = setup_db();
    let mut composer = composer(&conn, SetupConfig::new());
    let err = composer
        .register(QueryOption::new(
            "late",
            Phase::All,
            |_: &mut SqliteQuery, _: &Search, _: &Viewer| Ok(()),
        ))
        .unwrap_err();
    assert!(matches!(err, CanopyError::AlreadySetUp(ref entity) if entity == "categories"));
    assert!(err.is_configuration());
}

#[test]
fn configure_before_setup_is_rejected() {
    let composer: Options = Composer::new(TableRef::new("categories"));
    let err = composer
        .select(&Search::default(), &Viewer::default())
        .unwrap_err();
    assert!(matches!(err, CanopyError::NotSetUp(_)));
}

#[test]
fn setup_on_an_unknown_entity_fails() {
    let conn = setup_db();
    let mut composer: Options = Composer::new(TableRef::new("nowhere"));
    let err = composer
        .setup(&categories(&conn), SetupConfig::new())
        .unwrap_err();
    assert!(matches!(err, CanopyError::UnknownEntity(ref entity) if entity == "nowhere"));
    assert!(!composer.is_set_up());
}

#[test]
fn typed_options_downcast_dynamic_criteria() {
    let conn = setup_db();
    let mut composer: Composer<SqliteQuery, DynCriteria, ()> =
        Composer::new(TableRef::new("categories"));
    composer
        .register(QueryOption::typed::<Search, _>(
            "by-name",
            Phase::Seed,
            |query: &mut SqliteQuery, criteria: &Search, _: &()| {
                if let Some(predicate) = search(criteria, query.table())? {
                    query.r#where(predicate);
                }
                Ok(())
            },
        ))
        .unwrap();
    composer.setup(&categories(&conn), SetupConfig::new()).unwrap();

    let query = composer
        .select(&DynCriteria::new(Search::named("Phones")), &())
        .unwrap();
    let rows: Vec<Record> = Db::new(&conn).select(&query).unwrap();
    assert_eq!(names(&rows), vec!["Phones"]);

    let err = composer.select(&DynCriteria::new(42i32), &()).unwrap_err();
    match &err {
        CanopyError::CriteriaTypeMismatch { option, found, .. } => {
            assert_eq!(option, "by-name");
            assert_eq!(*found, "i32");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_configuration());
}

#[test]
fn permission_scope_restricts_the_seed() {
    let conn = setup_db();
    let alice = Viewer {
        owner: Some("alice".into()),
    };

    let scoped = composer(&conn, SetupConfig::new().permission(owned_by_viewer));
    let rows: Vec<Record> = Db::new(&conn)
        .select(&scoped.select(&Search::default(), &alice).unwrap())
        .unwrap();
    assert_eq!(names(&rows), vec!["Electronics"]);

    let anonymous: Vec<Record> = Db::new(&conn)
        .select(&scoped.select(&Search::default(), &Viewer::default()).unwrap())
        .unwrap();
    assert_eq!(anonymous.len(), 2);

    let open = composer(
        &conn,
        SetupConfig::new()
            .permission(owned_by_viewer)
            .without_permission(),
    );
    let rows: Vec<Record> = Db::new(&conn)
        .select(&open.select(&Search::default(), &alice).unwrap())
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn conditions_can_target_the_expansion_too() {
    let conn = setup_db();
    let alice = Viewer {
        owner: Some("alice".into()),
    };
    let retriever = HierarchyRetriever::default();

    let seed_only = composer(&conn, SetupConfig::new().permission(owned_by_viewer));
    let rows: Vec<Record> = Db::new(&conn)
        .retrieve(&retriever, &seed_only, &Search::default(), &alice, Selection::Entity)
        .unwrap();
    assert_eq!(rows.len(), 2);

    let both = composer(
        &conn,
        SetupConfig::new()
            .permission(owned_by_viewer)
            .condition_phases([Phase::Seed, Phase::Expansion]),
    );
    let rows: Vec<Record> = Db::new(&conn)
        .retrieve(&retriever, &both, &Search::default(), &alice, Selection::Entity)
        .unwrap();
    assert_eq!(names(&rows), vec!["Electronics"]);
}

#[test]
fn endpoints_are_shared_across_threads() {
    let conn = setup_db();
    let endpoint = Arc::new(
        ReadEndpoint::<Search, Viewer>::builder(categories(&conn))
            .setup(SetupConfig::new().criteria(search))
            .build()
            .unwrap(),
    );

    std::thread::scope(|scope| {
        for name in ["Electronics", "Phones"] {
            let endpoint = Arc::clone(&endpoint);
            scope.spawn(move || {
                let conn = setup_db();
                let rows = endpoint
                    .list(Db::new(&conn), &Search::named(name), &Viewer::default())
                    .unwrap();
                assert_eq!(names(&rows), vec![name]);
            });
        }
    });
}
