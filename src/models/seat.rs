use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Состояние места. `Occupied` означает активную бронь; `booked` принимается
/// на входе как синоним.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    #[serde(alias = "booked")]
    Occupied,
    Maintenance,
}

impl SeatStatus {
    pub const ALL: [SeatStatus; 3] = [
        SeatStatus::Available,
        SeatStatus::Occupied,
        SeatStatus::Maintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "available",
            SeatStatus::Occupied => "occupied",
            SeatStatus::Maintenance => "maintenance",
        }
    }

    pub fn is_booked(&self) -> bool {
        matches!(self, SeatStatus::Occupied)
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown seat status: {0}")]
pub struct UnknownSeatStatus(pub String);

impl FromStr for SeatStatus {
    type Err = UnknownSeatStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(SeatStatus::Available),
            "occupied" | "booked" => Ok(SeatStatus::Occupied),
            "maintenance" => Ok(SeatStatus::Maintenance),
            _ => Err(UnknownSeatStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    pub number: String,
    pub status: SeatStatus,
}

impl Seat {
    pub fn is_booked(&self) -> bool {
        self.status.is_booked()
    }
}

// Строка таблицы seats как она лежит в БД
#[derive(Debug, Clone, FromRow)]
pub struct SeatRow {
    pub id: i64,
    pub number: String,
    pub status: String,
}

impl TryFrom<SeatRow> for Seat {
    type Error = UnknownSeatStatus;

    fn try_from(row: SeatRow) -> Result<Self, Self::Error> {
        Ok(Seat {
            id: row.id,
            number: row.number,
            status: row.status.parse()?,
        })
    }
}

/// Ответ API: статус плюс булев `is_booked` для старых клиентов.
#[derive(Debug, Clone, Serialize)]
pub struct SeatResponse {
    pub id: i64,
    pub number: String,
    pub status: SeatStatus,
    pub is_booked: bool,
}

impl From<Seat> for SeatResponse {
    fn from(seat: Seat) -> Self {
        SeatResponse {
            is_booked: seat.is_booked(),
            id: seat.id,
            number: seat.number,
            status: seat.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_case_insensitively_with_booked_alias() {
        assert_eq!("Available".parse::<SeatStatus>().unwrap(), SeatStatus::Available);
        assert_eq!("booked".parse::<SeatStatus>().unwrap(), SeatStatus::Occupied);
        assert_eq!(" MAINTENANCE ".parse::<SeatStatus>().unwrap(), SeatStatus::Maintenance);
        assert!("broken".parse::<SeatStatus>().is_err());
    }

    #[test]
    fn status_round_trips_through_its_string_form() {
        for status in SeatStatus::ALL {
            assert_eq!(status.as_str().parse::<SeatStatus>().unwrap(), status);
        }
    }

    #[test]
    fn serde_accepts_booked_and_writes_occupied() {
        let status: SeatStatus = serde_json::from_str("\"booked\"").unwrap();
        assert_eq!(status, SeatStatus::Occupied);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"occupied\"");
    }

    #[test]
    fn only_occupied_counts_as_booked() {
        assert!(SeatStatus::Occupied.is_booked());
        assert!(!SeatStatus::Available.is_booked());
        assert!(!SeatStatus::Maintenance.is_booked());
    }

    #[test]
    fn row_with_unknown_status_is_rejected() {
        let row = SeatRow { id: 1, number: "1A".into(), status: "free".into() };
        assert_eq!(Seat::try_from(row), Err(UnknownSeatStatus("free".into())));
    }

    #[test]
    fn response_exposes_legacy_flag() {
        let seat = Seat { id: 7, number: "12A".into(), status: SeatStatus::Occupied };
        let json = serde_json::to_value(SeatResponse::from(seat)).unwrap();
        assert_eq!(json["status"], "occupied");
        assert_eq!(json["is_booked"], true);
    }
}
