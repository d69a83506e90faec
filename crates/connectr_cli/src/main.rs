//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `connectr_core` linkage and run one end-to-end flow against the
//!   configured store.
//! - Print ids and counts only; record contents stay out of stdout.

use connectr_core::{
    ConnectrService, CoreConfig, CoreResult, NewEvent, NewPerson, OwnerId, RelationshipType,
    StaticIdentity,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    println!("connectr_core ping={}", connectr_core::ping());
    println!("connectr_core version={}", connectr_core::core_version());

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("connectr smoke failed: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CoreResult<()> {
    let config = CoreConfig::from_env()?;
    if let Err(err) = connectr_core::init_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let owner = OwnerId::parse("smoke-user")?;
    let service = ConnectrService::new(config.open_store()?, StaticIdentity::signed_in(owner));

    let event_id = service.create_event(NewEvent::new("Smoke meetup")).await?;
    let ada = service.create_person(NewPerson::new("Ada", "Lovelace")).await?;
    let grace = service
        .add_new_attendee(&event_id, NewPerson::new("Grace", "Hopper"))
        .await?;
    service.link_person_to_event(&ada, &event_id).await?;
    service
        .create_relationship(&ada, &grace.id, RelationshipType::Colleague)
        .await?;

    let detail = service.event_detail(&event_id).await?;
    let person = service.person_detail(&grace.id).await?;
    println!(
        "smoke event_id={} attendees={} timeline={} related={}",
        event_id,
        detail.attendees.len(),
        service.timeline().await?.len(),
        person.relationships.len()
    );
    Ok(())
}
