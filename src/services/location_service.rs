// src/services/location_service.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LocationRepository,
    models::device::{
        effective_modem_status, is_location_online, Chip, CreateLocationPayload, Location,
        LocationOverview, Modem, ModemOverview,
    },
};

/// 64 caracteres hexadecimais, aleatórios.
pub fn generate_api_key() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Monta a árvore chipeira → modems → chips do painel.
pub fn assemble_overview(
    locations: Vec<Location>,
    modems: Vec<Modem>,
    chips: Vec<Chip>,
    now: DateTime<Utc>,
) -> Vec<LocationOverview> {
    let mut chips_by_modem: HashMap<Uuid, Vec<Chip>> = HashMap::new();
    for chip in chips {
        chips_by_modem.entry(chip.modem_id).or_default().push(chip);
    }

    let mut modems_by_location: HashMap<Uuid, Vec<ModemOverview>> = HashMap::new();
    for modem in modems {
        let effective_status = effective_modem_status(&modem.status, modem.last_seen_at, now);
        let chips = chips_by_modem.remove(&modem.id).unwrap_or_default();
        modems_by_location
            .entry(modem.location_id)
            .or_default()
            .push(ModemOverview { modem, effective_status, chips });
    }

    locations
        .into_iter()
        .map(|location| LocationOverview {
            is_online: is_location_online(location.last_seen_at, now),
            modems: modems_by_location.remove(&location.id).unwrap_or_default(),
            location,
        })
        .collect()
}

#[derive(Clone)]
pub struct LocationService {
    location_repo: LocationRepository,
}

impl LocationService {
    pub fn new(location_repo: LocationRepository) -> Self {
        Self { location_repo }
    }

    pub async fn create_location(
        &self,
        owner_id: Uuid,
        payload: &CreateLocationPayload,
    ) -> Result<Location, AppError> {
        let api_key = generate_api_key();
        let location = self
            .location_repo
            .create_location(
                owner_id,
                payload.name.trim(),
                payload.description.as_deref(),
                &api_key,
            )
            .await?;

        tracing::info!("📍 Chipeira {} criada para {}", location.id, owner_id);
        Ok(location)
    }

    /// Admin enxerga todas as chipeiras; os demais só as próprias.
    pub async fn overview(
        &self,
        caller_id: Uuid,
        is_admin: bool,
    ) -> Result<Vec<LocationOverview>, AppError> {
        let owner = (!is_admin).then_some(caller_id);
        let locations = self.location_repo.list_locations(owner).await?;

        let location_ids: Vec<Uuid> = locations.iter().map(|l| l.id).collect();
        let modems = self.location_repo.modems_for_locations(&location_ids).await?;

        let modem_ids: Vec<Uuid> = modems.iter().map(|m| m.id).collect();
        let chips = self.location_repo.chips_for_modems(&modem_ids).await?;

        Ok(assemble_overview(locations, modems, chips, Utc::now()))
    }

    pub async fn delete_location(
        &self,
        caller_id: Uuid,
        is_admin: bool,
        location_id: Uuid,
    ) -> Result<(), AppError> {
        let location = self
            .location_repo
            .find_by_id(location_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Chipeira não encontrada.".into()))?;

        if location.user_id != caller_id && !is_admin {
            return Err(AppError::Forbidden(
                "Você não tem permissão para remover esta chipeira.".into(),
            ));
        }

        self.location_repo.delete_location(location_id).await?;
        tracing::info!("🗑️ Chipeira {} removida por {}", location_id, caller_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn location(last_seen_at: Option<DateTime<Utc>>) -> Location {
        let now = Utc::now();
        Location {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Centro".into(),
            description: None,
            api_key: generate_api_key(),
            is_active: true,
            last_seen_at,
            created_at: now,
            updated_at: now,
        }
    }

    fn modem(location_id: Uuid, status: &str, last_seen_at: Option<DateTime<Utc>>) -> Modem {
        let now = Utc::now();
        Modem {
            id: Uuid::new_v4(),
            location_id,
            port_name: "COM1".into(),
            imei: None,
            operator: None,
            signal_strength: Some(-70),
            status: status.into(),
            last_seen_at,
            created_at: now,
            updated_at: now,
        }
    }

    fn chip(modem_id: Uuid) -> Chip {
        let now = Utc::now();
        Chip {
            id: Uuid::new_v4(),
            modem_id,
            phone_number: "+5511999990000".into(),
            iccid: None,
            operator: None,
            status: "active".into(),
            detected_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn api_keys_are_64_hex_chars_and_unique() {
        let a = generate_api_key();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, generate_api_key());
    }

    #[test]
    fn stale_online_modem_is_reported_offline() {
        let now = Utc::now();
        let loc = location(Some(now - Duration::seconds(200)));
        let fresh = modem(loc.id, "online", Some(now - Duration::seconds(30)));
        let stale = modem(loc.id, "online", Some(now - Duration::seconds(121)));
        let chips = vec![chip(fresh.id), chip(fresh.id)];
        let (fresh_id, stale_id) = (fresh.id, stale.id);

        let overview = assemble_overview(vec![loc], vec![fresh, stale], chips, now);

        assert_eq!(overview.len(), 1);
        assert!(overview[0].is_online);
        let by_id = |id: Uuid| overview[0].modems.iter().find(|m| m.modem.id == id).unwrap();
        assert_eq!(by_id(fresh_id).effective_status, "online");
        assert_eq!(by_id(fresh_id).chips.len(), 2);
        assert_eq!(by_id(stale_id).effective_status, "offline");
        assert!(by_id(stale_id).chips.is_empty());
    }

    #[test]
    fn location_without_recent_heartbeat_is_offline() {
        let now = Utc::now();
        let overview = assemble_overview(
            vec![location(Some(now - Duration::seconds(301))), location(None)],
            vec![],
            vec![],
            now,
        );
        assert!(overview.iter().all(|l| !l.is_online && l.modems.is_empty()));
    }
}
