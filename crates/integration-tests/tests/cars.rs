//! Integration tests for cars and both directions of ownership.
//!
//! Run with: cargo test -p carlot-integration-tests --test cars

use chrono::{TimeZone, Timelike, Utc};

use carlot_core::UserId;
use carlot_integration_tests::{age, memory_client};
use carlot_store::{Car, Client, NewCar, NewUser, RepositoryError, User};

/// Test helper: a Tesla and a Ford owned by a8m.
async fn seed_owner(client: &Client) -> (User, Vec<Car>) {
    let mut ids = Vec::new();
    for model in ["Tesla", "Ford"] {
        let car = client
            .cars()
            .create(&NewCar::registered_now(model))
            .await
            .expect("Failed to create car");
        ids.push(car.id);
    }

    let user = client
        .users()
        .create(&NewUser::new("a8m", age(30)).with_cars(ids))
        .await
        .expect("Failed to create user");

    let cars = client
        .cars()
        .list_for_owner(user.id)
        .await
        .expect("Failed to list cars");
    (user, cars)
}

// ============================================================================
// Forward Edge (user -> cars)
// ============================================================================

#[tokio::test]
async fn test_user_owns_both_cars() {
    let client = memory_client().await;
    let (user, cars) = seed_owner(&client).await;

    let models: Vec<&str> = cars.iter().map(|c| c.model.as_str()).collect();
    assert_eq!(models, ["Tesla", "Ford"]);
    assert!(cars.iter().all(|c| c.owner_id == Some(user.id)));

    client.close().await;
}

#[tokio::test]
async fn test_filter_by_model_returns_one_car() {
    let client = memory_client().await;
    let (user, _) = seed_owner(&client).await;

    let ford = client
        .cars()
        .only_for_owner_with_model(user.id, "Ford")
        .await
        .expect("Failed to filter cars");
    assert_eq!(ford.model, "Ford");

    client.close().await;
}

#[tokio::test]
async fn test_filter_by_model_errors() {
    let client = memory_client().await;
    let (user, _) = seed_owner(&client).await;
    let cars = client.cars();

    let err = cars
        .only_for_owner_with_model(user.id, "Fiat")
        .await
        .expect_err("no Fiat");
    assert!(err.is_not_found(), "unexpected error: {err}");

    let second_ford = cars
        .create(&NewCar::registered_now("Ford").owned_by(user.id))
        .await
        .expect("Failed to create car");
    assert_eq!(second_ford.owner_id, Some(user.id));

    let err = cars
        .only_for_owner_with_model(user.id, "Ford")
        .await
        .expect_err("two Fords");
    assert!(err.is_not_singular(), "unexpected error: {err}");

    client.close().await;
}

// ============================================================================
// Inverse Edge (car -> owner)
// ============================================================================

#[tokio::test]
async fn test_every_car_points_back_to_its_owner() {
    let client = memory_client().await;
    let (user, cars) = seed_owner(&client).await;

    for car in &cars {
        let owner = client
            .users()
            .owner_of(car)
            .await
            .expect("Failed to query owner");
        assert_eq!(owner.id, user.id, "owner of {car}");
    }

    client.close().await;
}

#[tokio::test]
async fn test_unowned_car_has_no_owner() {
    let client = memory_client().await;

    let car = client
        .cars()
        .create(&NewCar::registered_now("Tesla"))
        .await
        .expect("Failed to create car");
    let err = client
        .users()
        .owner_of(&car)
        .await
        .expect_err("car has no owner");
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert_eq!(err.to_string(), "user not found");

    client.close().await;
}

// ============================================================================
// Linking Existing Cars
// ============================================================================

#[tokio::test]
async fn test_assign_owner_once() {
    let client = memory_client().await;
    let cars = client.cars();

    let a8m = client
        .users()
        .create(&NewUser::new("a8m", age(30)))
        .await
        .expect("insert");
    let neta = client
        .users()
        .create(&NewUser::new("neta", age(28)))
        .await
        .expect("insert");
    let car = cars
        .create(&NewCar::registered_now("Tesla"))
        .await
        .expect("insert car");

    let linked = cars.assign_owner(car.id, a8m.id).await.expect("assign");
    assert_eq!(linked.owner_id, Some(a8m.id));

    // The stale `car` value still says "no owner"; the lookup reads the row.
    let owner = client.users().owner_of(&car).await.expect("owner");
    assert_eq!(owner.id, a8m.id);

    let err = cars
        .assign_owner(car.id, neta.id)
        .await
        .expect_err("already owned");
    assert!(matches!(err, RepositoryError::Conflict(_)), "unexpected error: {err}");

    client.close().await;
}

#[tokio::test]
async fn test_assign_to_unknown_user_is_conflict() {
    let client = memory_client().await;

    let car = client
        .cars()
        .create(&NewCar::registered_now("Tesla"))
        .await
        .expect("insert car");
    let err = client
        .cars()
        .assign_owner(car.id, UserId::new(999))
        .await
        .expect_err("no such user");
    assert!(matches!(err, RepositoryError::Conflict(_)), "unexpected error: {err}");

    client.close().await;
}

// ============================================================================
// Validation & Storage
// ============================================================================

#[tokio::test]
async fn test_create_rejects_blank_model() {
    let client = memory_client().await;

    let err = client
        .cars()
        .create(&NewCar::registered_now("  "))
        .await
        .expect_err("blank model");
    assert!(matches!(err, RepositoryError::Validation(_)), "unexpected error: {err}");
    assert!(client.cars().list_all().await.expect("list").is_empty());

    client.close().await;
}

#[tokio::test]
async fn test_create_with_unknown_owner_is_conflict() {
    let client = memory_client().await;

    let err = client
        .cars()
        .create(&NewCar::registered_now("Ford").owned_by(UserId::new(42)))
        .await
        .expect_err("no such user");
    assert!(matches!(err, RepositoryError::Conflict(_)), "unexpected error: {err}");

    // The rejected insert must not leave a row behind.
    assert!(client.cars().list_all().await.expect("list").is_empty());

    client.close().await;
}

#[tokio::test]
async fn test_create_reports_stored_ids() {
    let client = memory_client().await;
    let cars = client.cars();

    let tesla = cars
        .create(&NewCar::registered_now("Tesla"))
        .await
        .expect("insert Tesla");
    let ford = cars
        .create(&NewCar::registered_now("Ford"))
        .await
        .expect("insert Ford");
    assert_ne!(tesla.id, ford.id);

    for created in [&tesla, &ford] {
        let stored = cars
            .get_by_id(created.id)
            .await
            .expect("get car")
            .expect("car exists");
        assert_eq!(&stored, created);
    }
    assert_eq!(cars.list_all().await.expect("list"), vec![tesla, ford]);

    client.close().await;
}

#[tokio::test]
async fn test_registered_at_keeps_microseconds() {
    let client = memory_client().await;

    let at = Utc
        .with_ymd_and_hms(2024, 5, 1, 8, 30, 15)
        .single()
        .expect("valid time")
        .with_nanosecond(123_456_789)
        .expect("valid nanos");

    let created = client
        .cars()
        .create(&NewCar::new("Tesla", at))
        .await
        .expect("insert car");
    let stored = client
        .cars()
        .get_by_id(created.id)
        .await
        .expect("get car")
        .expect("car exists");

    assert_eq!(stored.registered_at.nanosecond(), 123_456_000);
    assert_eq!(stored, created);
    assert_eq!(
        stored.to_string(),
        format!("Car(id={}, model=Tesla, registered_at=Wed May  1 08:30:15 2024)", stored.id)
    );

    client.close().await;
}
