use anyhow::Context;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{CallSession, CallStage, CallSummary, ConstraintSet, Disposition};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ── Call sessions ──

pub fn save_call(conn: &Connection, session: &CallSession) -> anyhow::Result<()> {
    let constraints =
        serde_json::to_string(&session.constraints).context("failed to serialize constraints")?;
    let transcript =
        serde_json::to_string(&session.transcript).context("failed to serialize transcript")?;
    let disposition = session
        .disposition
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .context("failed to serialize disposition")?;

    conn.execute(
        "INSERT INTO calls (id, lead_phone, lead_name, stage, constraints, transcript,
            disposition, consent_retries, consecutive_objections, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET
            stage = excluded.stage,
            constraints = excluded.constraints,
            transcript = excluded.transcript,
            disposition = excluded.disposition,
            consent_retries = excluded.consent_retries,
            consecutive_objections = excluded.consecutive_objections,
            updated_at = excluded.updated_at",
        params![
            session.id,
            session.lead_phone,
            session.lead_name,
            session.stage.as_str(),
            constraints,
            transcript,
            disposition,
            session.consent_retries,
            session.consecutive_objections,
            session.created_at.format(DATETIME_FMT).to_string(),
            session.updated_at.format(DATETIME_FMT).to_string(),
        ],
    )
    .context("failed to save call session")?;

    Ok(())
}

pub fn get_call(conn: &Connection, id: &str) -> anyhow::Result<Option<CallSession>> {
    let mut stmt = conn.prepare(
        "SELECT id, lead_phone, lead_name, stage, constraints, transcript, disposition,
                consent_retries, consecutive_objections, created_at, updated_at
         FROM calls WHERE id = ?1",
    )?;

    let row = stmt
        .query_row(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, u32>(7)?,
                row.get::<_, u32>(8)?,
                row.get::<_, String>(9)?,
                row.get::<_, String>(10)?,
            ))
        })
        .optional()
        .context("failed to query call session")?;

    let Some((
        id,
        lead_phone,
        lead_name,
        stage,
        constraints_json,
        transcript_json,
        disposition_json,
        consent_retries,
        consecutive_objections,
        created_at,
        updated_at,
    )) = row
    else {
        return Ok(None);
    };

    let constraints: ConstraintSet =
        serde_json::from_str(&constraints_json).context("corrupt constraints column")?;
    let transcript =
        serde_json::from_str(&transcript_json).context("corrupt transcript column")?;
    let disposition: Option<Disposition> = disposition_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("corrupt disposition column")?;

    Ok(Some(CallSession {
        id,
        lead_phone,
        lead_name,
        stage: CallStage::parse(&stage),
        constraints,
        transcript,
        disposition,
        consent_retries,
        consecutive_objections,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    }))
}

pub fn list_calls(conn: &Connection, limit: i64) -> anyhow::Result<Vec<CallSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, lead_phone, lead_name, stage, disposition, updated_at
         FROM calls ORDER BY updated_at DESC, id LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut summaries = Vec::new();
    for row in rows {
        let (id, lead_phone, lead_name, stage, disposition_json, updated_at) = row?;
        let disposition = disposition_json
            .as_deref()
            .and_then(|d| serde_json::from_str(d).ok());
        summaries.push(CallSummary {
            id,
            lead_phone,
            lead_name,
            stage: CallStage::parse(&stage),
            disposition,
            updated_at: parse_datetime(&updated_at),
        });
    }

    Ok(summaries)
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT)
        .unwrap_or_else(|_| chrono::Utc::now().naive_utc())
}
