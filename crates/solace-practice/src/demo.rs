//! Demo data for local development and the `SOLACE_SEED_DEMO` mode.

use serde_json::json;
use uuid::Uuid;

use solace_core::channel::ChannelCode;
use solace_core::models::patient::{Diagnosis, Patient};
use solace_core::models::task::TaskPriority;
use solace_core::validate::messages::ComposeMessage;
use solace_core::validate::tasks::NewTask;

use crate::error::PracticeError;
use crate::messaging::{InboundMessage, MessagingService};
use crate::tasks::TaskService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub patients: usize,
    pub messages: usize,
    pub tasks: usize,
}

struct DemoPatient {
    first: &'static str,
    last: &'static str,
    dob: (i16, i8, i8),
    email: Option<&'static str>,
    phone: Option<&'static str>,
    portal: bool,
    diagnosis: (&'static str, &'static str),
}

const PATIENTS: [DemoPatient; 4] = [
    DemoPatient {
        first: "Maya",
        last: "Okafor",
        dob: (1991, 4, 17),
        email: Some("maya.okafor@example.com"),
        phone: Some("+15555550101"),
        portal: true,
        diagnosis: ("F41.1", "Generalized anxiety disorder"),
    },
    DemoPatient {
        first: "Daniel",
        last: "Reyes",
        dob: (1984, 9, 2),
        email: None,
        phone: Some("+15555550102"),
        portal: false,
        diagnosis: ("F33.1", "Major depressive disorder, recurrent, moderate"),
    },
    DemoPatient {
        first: "Priya",
        last: "Natarajan",
        dob: (2001, 1, 23),
        email: Some("priya.n@example.com"),
        phone: None,
        portal: true,
        diagnosis: ("F43.10", "Post-traumatic stress disorder, unspecified"),
    },
    DemoPatient {
        first: "Tom",
        last: "Lindqvist",
        dob: (1976, 11, 30),
        email: Some("tom.lindqvist@example.com"),
        phone: Some("+15555550104"),
        portal: false,
        diagnosis: ("F90.0", "ADHD, predominantly inattentive type"),
    },
];

/// Populate the store with patients, a few conversations and pending tasks.
pub async fn seed(
    messaging: &MessagingService,
    tasks: &TaskService,
) -> Result<SeedSummary, PracticeError> {
    let now = jiff::Timestamp::now();
    let mut ids = Vec::with_capacity(PATIENTS.len());

    for demo in &PATIENTS {
        let (y, m, d) = demo.dob;
        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: demo.first.to_string(),
            last_name: demo.last.to_string(),
            date_of_birth: jiff::civil::date(y, m, d),
            email: demo.email.map(str::to_string),
            phone: demo.phone.map(str::to_string),
            fax: None,
            portal_enabled: demo.portal,
            diagnoses: vec![Diagnosis {
                code: demo.diagnosis.0.to_string(),
                description: demo.diagnosis.1.to_string(),
            }],
            created_at: now,
        };
        messaging.patients().save(&patient).await?;
        ids.push(patient.id);
    }

    let inbound = [
        (ids[0], ChannelCode::Sms, "Running ten minutes late today, sorry!"),
        (ids[2], ChannelCode::Chat, "Can we move Thursday's session to the afternoon?"),
        (ids[3], ChannelCode::Email, "Attached is the completed intake questionnaire."),
    ];
    for (patient_id, channel_code, content) in inbound {
        messaging
            .record_inbound(&InboundMessage {
                patient_id,
                channel_code,
                subject: None,
                content: content.to_string(),
            })
            .await?;
    }

    let outbound = [
        (ids[0], ChannelCode::Sms, "No problem, see you soon."),
        (ids[1], ChannelCode::Sms, "Reminder: your session is tomorrow at 10:00."),
    ];
    for (patient_id, channel_code, content) in outbound {
        messaging
            .send_message(&ComposeMessage {
                patient_id,
                channel_code,
                subject: None,
                content: content.to_string(),
            })
            .await?;
    }

    let today = now.to_zoned(jiff::tz::TimeZone::UTC).date();
    let new_tasks = [
        (Some(ids[1]), "Review PHQ-9 trend before next session", TaskPriority::High, 1),
        (Some(ids[2]), "Send PCL-5 questionnaire", TaskPriority::Medium, 3),
        (None, "Sign off on last week's session notes", TaskPriority::Urgent, 0),
    ];
    for (patient_id, title, priority, due_in_days) in new_tasks {
        tasks
            .create(NewTask {
                patient_id,
                title: title.to_string(),
                description: None,
                priority,
                due_date: today.checked_add(jiff::Span::new().days(due_in_days)).ok(),
                metadata: json!({ "source": "demo" })
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
            })
            .await?;
    }

    Ok(SeedSummary {
        patients: ids.len(),
        messages: inbound.len() + outbound.len(),
        tasks: new_tasks.len(),
    })
}
