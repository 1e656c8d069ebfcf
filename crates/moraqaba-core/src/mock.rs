#![forbid(unsafe_code)]

//! Fixed demo data.
//!
//! Everything here is constant. Nothing is fetched, persisted or mutated at
//! runtime.

use crate::records::{
    AttendanceRecord, AttendanceStatus, CheckInTime, Feedback, Rating, Region,
};

/// Day covered by the attendance snapshot.
pub const SNAPSHOT_DATE: &str = "2024-03-20";
/// Facility the attendance snapshot belongs to.
pub const SNAPSHOT_FACILITY: &str = "CHU Ibn Sina";

pub fn attendance() -> Vec<AttendanceRecord> {
    [
        ("1", "dr1", "Dr. Amine El Mansouri", CheckInTime::at(8, 5), AttendanceStatus::Present),
        ("2", "dr2", "Dr. Sarah Benani", CheckInTime::at(8, 12), AttendanceStatus::Present),
        ("3", "dr3", "Dr. Khalid Tazi", CheckInTime::at(9, 30), AttendanceStatus::Late),
        ("4", "dr4", "Dr. Fatima Zahra", CheckInTime::Missing, AttendanceStatus::Absent),
    ]
    .into_iter()
    .map(|(id, user_id, user_name, check_in, status)| AttendanceRecord {
        id: id.to_string(),
        user_id: user_id.to_string(),
        user_name: user_name.to_string(),
        date: SNAPSHOT_DATE.to_string(),
        check_in,
        status,
        facility: SNAPSHOT_FACILITY.to_string(),
    })
    .collect()
}

/// Presence vs. predicted presence for one weekday, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStat {
    pub name: &'static str,
    pub presence: u8,
    pub predicted: u8,
}

pub const WEEKLY_STATS: &[DayStat] = &[
    DayStat { name: "Lun", presence: 85, predicted: 82 },
    DayStat { name: "Mar", presence: 88, predicted: 85 },
    DayStat { name: "Mer", presence: 92, predicted: 89 },
    DayStat { name: "Jeu", presence: 90, predicted: 91 },
    DayStat { name: "Ven", presence: 78, predicted: 80 },
];

/// Headline card on the staff dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpiCard {
    pub label: &'static str,
    pub value: &'static str,
    pub trend: &'static str,
}

pub const DASHBOARD_KPIS: &[KpiCard] = &[
    KpiCard { label: "Présents aujourd'hui", value: "1,284", trend: "+12%" },
    KpiCard { label: "Absents (Alertes)", value: "42", trend: "-2%" },
    KpiCard { label: "Taux de Ponctualité", value: "94%", trend: "Stable" },
    KpiCard { label: "Indice Performance", value: "8.4/10", trend: "IA" },
];

/// National headline figures shown next to the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NationalKpis {
    pub presence_rate: f32,
    pub active_facilities: u32,
    pub critical_alerts: u32,
}

pub const NATIONAL_KPIS: NationalKpis = NationalKpis {
    presence_rate: 92.4,
    active_facilities: 142,
    critical_alerts: 3,
};

/// Static analysis note shown under the national map.
pub const REGIONAL_ANALYSIS: &str = "La région Nord présente un risque d'absentéisme accru de 5% \
pour mardi prochain en raison des prévisions météorologiques. Recommandation : Activer le pool \
de remplacement.";

pub const PREDICTION_FACTORS: &[&str] = &[
    "Saisonalité grippale (+15% risque)",
    "Événements régionaux",
    "Historique des congés",
];

pub const RECOMMENDED_ACTIONS: &[&str] = &[
    "Préparer les renforts",
    "Optimiser les plannings",
    "Alerter les directeurs",
];

pub const REGIONS: &[Region] = &[
    Region { id: "tanger", name: "Tanger-Tétouan-Al Hoceïma" },
    Region { id: "oriental", name: "L’Oriental" },
    Region { id: "fes", name: "Fès-Meknès" },
    Region { id: "rabat", name: "Rabat-Salé-Kénitra" },
    Region { id: "casa", name: "Casablanca-Settat" },
    Region { id: "beni", name: "Béni Mellal-Khénifra" },
    Region { id: "marrakech", name: "Marrakech-Safi" },
    Region { id: "draa", name: "Drâa-Tafilalet" },
    Region { id: "souss", name: "Souss-Massa" },
    Region { id: "guelmim", name: "Guelmim-Oued Noun" },
    Region { id: "laayoune", name: "Laâyoune-Sakia El Hamra" },
    Region { id: "dakhla", name: "Dakhla-Oued Ed-Dahab" },
];

/// Facilities a citizen can rate from the citizen dashboard.
pub const RATEABLE_FACILITIES: &[&str] =
    &["CHU Ibn Sina", "Hôpital Militaire", "Centre de Santé Rabat"];

/// City line printed under each rateable facility.
pub const FACILITY_CITY: &str = "Rabat, Maroc";

const REVIEW_COMMENT: &str =
    "Très bon accueil. Le personnel médical était présent et à l'écoute. Service rapide.";

pub fn citizen_reviews() -> Vec<Feedback> {
    (1..=3u32)
        .filter_map(|i| {
            let rating = Rating::new(4).ok()?;
            Some(Feedback {
                id: format!("fb{i}"),
                citizen_name: format!("Citoyen #{}", 1200 + i),
                facility: SNAPSHOT_FACILITY.to_string(),
                rating,
                comment: REVIEW_COMMENT.to_string(),
                date: "Hier".to_string(),
            })
        })
        .collect()
}

pub fn region(id: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.id == id)
}
