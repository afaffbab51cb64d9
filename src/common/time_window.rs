// src/common/time_window.rs

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::common::error::AppError;

/// Intervalo semiaberto `[start, end)` de um dia local, em UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Meia-noite local de `date` até a meia-noite local do dia seguinte.
    /// Usa o dia seguinte do calendário (não +24h) por causa do horário de verão.
    pub fn for_local_date(date: NaiveDate, tz: Tz) -> Result<Self, AppError> {
        let next = date
            .succ_opt()
            .ok_or_else(|| AppError::InvalidFilter(format!("Data fora do intervalo: {date}")))?;

        Ok(Self {
            start: local_midnight(date, tz)?,
            end: local_midnight(next, tz)?,
        })
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }

    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

// Passo usado para achar o primeiro instante válido quando a meia-noite
// cai dentro de um salto de horário de verão.
const GAP_STEP_MINUTES: i64 = 15;

fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>, AppError> {
    let midnight = date.and_time(NaiveTime::MIN);

    // Meia-noite pulada (ex.: 00:00 -> 01:00): o dia começa no primeiro
    // horário local que existe.
    let mut naive = midnight;
    while naive.date() == date {
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => return Ok(dt.with_timezone(&Utc)),
            // Meia-noite repetida: o dia começa na primeira ocorrência
            LocalResult::Ambiguous(earliest, _) => return Ok(earliest.with_timezone(&Utc)),
            LocalResult::None => naive += Duration::minutes(GAP_STEP_MINUTES),
        }
    }

    Err(AppError::InvalidFilter(format!(
        "A data {date} não tem nenhum horário válido no fuso {tz}."
    )))
}

/// "Hoje" no fuso configurado.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}
