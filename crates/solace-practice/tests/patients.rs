mod common;

use solace_core::validate::patients::PatientSearch;
use solace_practice::demo;
use solace_practice::error::PracticeError;
use solace_practice::patients::PatientDirectory;
use solace_practice::tasks::TaskService;
use uuid::Uuid;

fn search(q: Option<&str>, limit: u32) -> PatientSearch {
    PatientSearch {
        q: q.map(str::to_string),
        limit,
    }
}

#[tokio::test]
async fn search_matches_name_email_and_phone() {
    let store = common::store();
    let directory = PatientDirectory::new(store);
    let mut maya = common::patient("Maya", "Okafor");
    maya.phone = Some("+15555550101".to_string());
    let daniel = common::patient("Daniel", "Reyes");
    directory.save(&maya).await.unwrap();
    directory.save(&daniel).await.unwrap();

    let by_name = directory.search(&search(Some("oKaF"), 50)).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].full_name, "Maya Okafor");

    let by_email = directory.search(&search(Some("daniel@"), 50)).await.unwrap();
    assert_eq!(by_email[0].id, daniel.id);

    let by_phone = directory.search(&search(Some("0101"), 50)).await.unwrap();
    assert_eq!(by_phone[0].id, maya.id);
}

#[tokio::test]
async fn unfiltered_search_is_sorted_and_limited() {
    let store = common::store();
    let directory = PatientDirectory::new(store);
    for (first, last) in [("Zoe", "Adams"), ("Tom", "Lindqvist"), ("Ann", "Adams")] {
        directory.save(&common::patient(first, last)).await.unwrap();
    }

    let names: Vec<String> = directory
        .search(&search(None, 2))
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.full_name)
        .collect();
    assert_eq!(names, vec!["Ann Adams", "Zoe Adams"]);
}

#[tokio::test]
async fn get_unknown_patient_is_not_found() {
    let directory = PatientDirectory::new(common::store());
    let err = directory.get(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, PracticeError::PatientNotFound(_)));
}

#[tokio::test]
async fn demo_seed_populates_every_area() {
    let store = common::store();
    let messaging = common::service(&store);
    let tasks = TaskService::new(store.clone());

    let summary = demo::seed(&messaging, &tasks).await.unwrap();
    assert_eq!(summary.patients, 4);

    let patients = messaging.patients().search(&search(None, 50)).await.unwrap();
    assert_eq!(patients.len(), summary.patients);

    let conversations = messaging
        .get_conversations(&Default::default())
        .await
        .unwrap();
    assert_eq!(conversations.conversations.len(), 4);
    assert_eq!(conversations.unread_total, 3);
}
