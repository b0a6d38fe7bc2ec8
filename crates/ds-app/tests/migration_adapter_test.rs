mod support;

use ds_app::migration::{MachineAccess, MigrationAdapters};
use ds_core::derive::Screen;
use ds_core::{ErrorCode, OnboardingStep, PhoneType, Platform, UserData};
use support::{complete_data, gate, HarnessBuilder, USER};

#[test]
fn machine_access_is_absent_when_flag_disabled() {
    let harness = HarnessBuilder::new(Platform::Linux).build();

    assert!(MachineAccess::optional(&gate(false), &harness.orchestrator).is_none());
    assert!(MachineAccess::optional(&gate(true), &harness.orchestrator).is_some());
}

#[tokio::test]
async fn both_implementations_agree_for_returning_user() {
    let data = complete_data(Platform::MacOS, PhoneType::IPhone);

    let machine_harness = HarnessBuilder::new(Platform::MacOS)
        .returning_user(data.clone())
        .build();
    let machine = MigrationAdapters::build(
        &gate(true),
        &machine_harness.orchestrator,
        machine_harness.ports.clone(),
    );
    assert!(machine.uses_state_machine());
    machine_harness.orchestrator.boot().await;

    let legacy_harness = HarnessBuilder::new(Platform::MacOS)
        .returning_user(data)
        .build();
    let legacy = MigrationAdapters::build(
        &gate(false),
        &legacy_harness.orchestrator,
        legacy_harness.ports.clone(),
    );
    assert!(!legacy.uses_state_machine());
    assert!(legacy.navigation.machine_state().is_none());

    assert_eq!(
        machine.navigation.refresh().await,
        legacy.navigation.refresh().await
    );
    assert_eq!(
        machine.phone_type.refresh().await.unwrap(),
        legacy.phone_type.refresh().await.unwrap()
    );
    assert_eq!(
        machine.email_onboarding.refresh().await.unwrap(),
        legacy.email_onboarding.refresh().await.unwrap()
    );

    let machine_storage = machine.secure_storage.refresh().await.unwrap();
    let legacy_storage = legacy.secure_storage.refresh().await.unwrap();
    assert_eq!(machine_storage, legacy_storage);
    assert_eq!(machine_storage.has_key_store, Some(true));
    assert!(!legacy_storage.is_checking);
}

#[tokio::test]
async fn both_implementations_agree_on_secure_storage_screen() {
    let machine_harness = HarnessBuilder::new(Platform::MacOS).new_user().build();
    let machine = MigrationAdapters::build(
        &gate(true),
        &machine_harness.orchestrator,
        machine_harness.ports.clone(),
    );
    machine_harness.orchestrator.boot().await;
    machine.phone_type.select(PhoneType::IPhone).await.unwrap();
    assert_eq!(
        machine.navigation.refresh().await.params.step,
        Some(OnboardingStep::SecureStorage)
    );

    let legacy_harness = HarnessBuilder::new(Platform::MacOS).new_user().build();
    let legacy = MigrationAdapters::build(
        &gate(false),
        &legacy_harness.orchestrator,
        legacy_harness.ports.clone(),
    );
    legacy.phone_type.select(PhoneType::IPhone).await.unwrap();

    let machine_storage = machine.secure_storage.refresh().await.unwrap();
    let legacy_storage = legacy.secure_storage.refresh().await.unwrap();

    assert_eq!(machine_storage, legacy_storage);
    assert_eq!(machine_storage.has_key_store, Some(true));
    assert!(!machine_storage.has_completed_setup);
}

#[tokio::test]
async fn both_implementations_point_new_user_at_the_same_step() {
    let machine_harness = HarnessBuilder::new(Platform::Windows).new_user().build();
    let machine = MigrationAdapters::build(
        &gate(true),
        &machine_harness.orchestrator,
        machine_harness.ports.clone(),
    );
    machine_harness.orchestrator.boot().await;

    let legacy_harness = HarnessBuilder::new(Platform::Windows).new_user().build();
    let legacy = MigrationAdapters::build(
        &gate(false),
        &legacy_harness.orchestrator,
        legacy_harness.ports.clone(),
    );

    let machine_target = machine.navigation.refresh().await;
    let legacy_target = legacy.navigation.refresh().await;

    assert_eq!(machine_target.screen, Screen::Onboarding);
    assert_eq!(machine_target.params.step, Some(OnboardingStep::PhoneType));
    assert_eq!(machine_target, legacy_target);
}

#[tokio::test]
async fn phone_type_selection_persists_through_either_path() {
    for enabled in [true, false] {
        let harness = HarnessBuilder::new(Platform::Windows).new_user().build();
        let adapters =
            MigrationAdapters::build(&gate(enabled), &harness.orchestrator, harness.ports.clone());
        harness.orchestrator.boot().await;

        let status = adapters.phone_type.select(PhoneType::IPhone).await.unwrap();

        assert!(status.has_selected, "enabled={enabled}");
        assert_eq!(status.phone_type, Some(PhoneType::IPhone));
        assert_eq!(
            harness.user_data.stored(USER).and_then(|data| data.phone_type),
            Some(PhoneType::IPhone),
            "enabled={enabled}"
        );
    }
}

#[tokio::test]
async fn email_skip_marks_onboarding_done_without_connection() {
    for enabled in [true, false] {
        let harness = HarnessBuilder::new(Platform::Linux)
            .returning_user(UserData {
                phone_type: Some(PhoneType::Android),
                ..UserData::default()
            })
            .build();
        let adapters =
            MigrationAdapters::build(&gate(enabled), &harness.orchestrator, harness.ports.clone());
        harness.orchestrator.boot().await;

        let status = adapters.email_onboarding.skip().await.unwrap();

        assert!(status.has_completed, "enabled={enabled}");
        assert!(!status.is_connected, "enabled={enabled}");
        let stored = harness.user_data.stored(USER).unwrap();
        assert!(stored.email_onboarding_completed);
        assert!(!stored.email_connected);
    }
}

#[tokio::test]
async fn legacy_navigation_reports_database_failure() {
    let harness = HarnessBuilder::new(Platform::Linux)
        .returning_user(UserData::default())
        .db_failures(1)
        .build();
    let adapters = MigrationAdapters::build(&gate(false), &harness.orchestrator, harness.ports.clone());

    let target = adapters.navigation.refresh().await;

    assert_eq!(target.screen, Screen::Error);
    assert_eq!(
        target.params.error.map(|error| error.code),
        Some(ErrorCode::DatabaseInitError)
    );
    assert_eq!(adapters.navigation.target().screen, Screen::Error);
}

#[tokio::test]
async fn legacy_navigation_sends_signed_out_user_to_login() {
    let harness = HarnessBuilder::new(Platform::MacOS).build();
    let adapters = MigrationAdapters::build(&gate(false), &harness.orchestrator, harness.ports.clone());

    let target = adapters.navigation.refresh().await;

    assert_eq!(target.screen, Screen::Login);
}

#[tokio::test]
async fn legacy_completion_without_session_is_rejected() {
    let harness = HarnessBuilder::new(Platform::MacOS).build();
    let adapters = MigrationAdapters::build(&gate(false), &harness.orchestrator, harness.ports.clone());

    let result = adapters.secure_storage.complete_setup().await;

    assert!(matches!(
        result,
        Err(ds_app::migration::AdapterError::NotSignedIn)
    ));
}
