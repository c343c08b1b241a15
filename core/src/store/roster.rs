use super::RosterStore;
use crate::{
    error::{PlanError, PlanResult},
    member::{HolidayKind, HolidayPeriod, Role, TeamMember},
};
use chrono::NaiveDate;
use rusqlite::{params, types::Type, Connection, OptionalExtension};
use std::collections::HashMap;

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_date(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    raw.parse::<NaiveDate>().map_err(|e| conversion_error(idx, e))
}

// Helper function for mapping member rows (holidays attached separately)
fn member_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<TeamMember> {
    let role: String = row.get(2)?;
    Ok(TeamMember {
        id: row.get(0)?,
        name: row.get(1)?,
        role: role.parse::<Role>().map_err(|e| conversion_error(2, e))?,
        base_capacity_per_sprint: row.get(3)?,
        company_tenure_months: row.get::<_, i64>(4)? as u32,
        team_tenure_months: row.get::<_, i64>(5)? as u32,
        is_upskilling: row.get::<_, i32>(6)? != 0,
        holidays: Vec::new(),
    })
}

fn holiday_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, HolidayPeriod)> {
    let kind: String = row.get(4)?;
    Ok((
        row.get(0)?,
        HolidayPeriod {
            id: row.get(1)?,
            start: parse_date(row, 2)?,
            end: parse_date(row, 3)?,
            kind: kind.parse::<HolidayKind>().map_err(|e| conversion_error(4, e))?,
            description: row.get(5)?,
        },
    ))
}

fn insert_member_row(conn: &Connection, m: &TeamMember, position: i64) -> PlanResult<()> {
    conn.execute(
        "INSERT INTO team_member (
            member_id, position, name, role, base_capacity_per_sprint,
            company_tenure_months, team_tenure_months, is_upskilling
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &m.id,
            position,
            &m.name,
            m.role.code(),
            m.base_capacity_per_sprint,
            m.company_tenure_months as i64,
            m.team_tenure_months as i64,
            if m.is_upskilling { 1i32 } else { 0i32 },
        ],
    )?;
    insert_holidays(conn, m)
}

fn insert_holidays(conn: &Connection, m: &TeamMember) -> PlanResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO holiday_period (
            member_id, holiday_id, position, start_date, end_date, kind, description
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for (position, h) in m.holidays.iter().enumerate() {
        stmt.execute(params![
            &m.id,
            &h.id,
            position as i64,
            h.start.to_string(),
            h.end.to_string(),
            h.kind.code(),
            &h.description,
        ])?;
    }
    Ok(())
}

fn not_found(member_id: &str) -> PlanError {
    PlanError::MemberNotFound {
        member_id: member_id.to_string(),
    }
}

impl RosterStore {
    // ── Reads ──────────────────────────────────────────────────────

    /// Snapshot of the whole roster in insertion order, holidays attached.
    pub fn list_members(&self) -> PlanResult<Vec<TeamMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT member_id, name, role, base_capacity_per_sprint,
                    company_tenure_months, team_tenure_months, is_upskilling
             FROM team_member ORDER BY position ASC",
        )?;
        let mut members = stmt
            .query_map([], member_row_mapper)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT member_id, holiday_id, start_date, end_date, kind, description
             FROM holiday_period ORDER BY member_id ASC, position ASC",
        )?;
        let mut holidays: HashMap<String, Vec<HolidayPeriod>> = HashMap::new();
        for row in stmt.query_map([], holiday_row_mapper)? {
            let (member_id, holiday) = row?;
            holidays.entry(member_id).or_default().push(holiday);
        }

        for m in &mut members {
            if let Some(h) = holidays.remove(&m.id) {
                m.holidays = h;
            }
        }
        Ok(members)
    }

    pub fn get_member(&self, member_id: &str) -> PlanResult<TeamMember> {
        let mut member = self
            .conn
            .query_row(
                "SELECT member_id, name, role, base_capacity_per_sprint,
                        company_tenure_months, team_tenure_months, is_upskilling
                 FROM team_member WHERE member_id = ?1",
                params![member_id],
                member_row_mapper,
            )
            .optional()?
            .ok_or_else(|| not_found(member_id))?;

        let mut stmt = self.conn.prepare(
            "SELECT member_id, holiday_id, start_date, end_date, kind, description
             FROM holiday_period WHERE member_id = ?1 ORDER BY position ASC",
        )?;
        member.holidays = stmt
            .query_map(params![member_id], holiday_row_mapper)?
            .map(|r| r.map(|(_, h)| h))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(member)
    }

    pub fn member_count(&self) -> PlanResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM team_member", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ── Mutations ──────────────────────────────────────────────────

    /// Append a member to the end of the roster.
    pub fn add_member(&self, member: &TeamMember) -> PlanResult<()> {
        member.validate()?;
        let tx = self.conn.unchecked_transaction()?;

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM team_member WHERE member_id = ?1",
                params![&member.id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(PlanError::InvalidMember {
                member_id: member.id.clone(),
                reason: "a member with this id already exists".into(),
            });
        }

        let position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM team_member",
            [],
            |row| row.get(0),
        )?;
        insert_member_row(&tx, member, position)?;
        tx.commit()?;

        log::info!("roster: added {} ({}) as {}", member.name, member.id, member.role);
        Ok(())
    }

    /// Replace the member stored under `member_id`, keeping its roster
    /// position. The record's own id must match.
    pub fn update_member(&self, member_id: &str, member: &TeamMember) -> PlanResult<()> {
        member.validate()?;
        if member.id != member_id {
            return Err(PlanError::InvalidMember {
                member_id: member_id.to_string(),
                reason: format!("record carries a different id '{}'", member.id),
            });
        }
        let tx = self.conn.unchecked_transaction()?;

        let updated = tx.execute(
            "UPDATE team_member SET
                name = ?2, role = ?3, base_capacity_per_sprint = ?4,
                company_tenure_months = ?5, team_tenure_months = ?6, is_upskilling = ?7
             WHERE member_id = ?1",
            params![
                member_id,
                &member.name,
                member.role.code(),
                member.base_capacity_per_sprint,
                member.company_tenure_months as i64,
                member.team_tenure_months as i64,
                if member.is_upskilling { 1i32 } else { 0i32 },
            ],
        )?;
        if updated == 0 {
            return Err(not_found(member_id));
        }

        tx.execute(
            "DELETE FROM holiday_period WHERE member_id = ?1",
            params![member_id],
        )?;
        insert_holidays(&tx, member)?;
        tx.commit()?;

        log::info!("roster: updated {} ({member_id})", member.name);
        Ok(())
    }

    /// Remove a member; their holidays go with them.
    pub fn delete_member(&self, member_id: &str) -> PlanResult<()> {
        let deleted = self.conn.execute(
            "DELETE FROM team_member WHERE member_id = ?1",
            params![member_id],
        )?;
        if deleted == 0 {
            return Err(not_found(member_id));
        }
        log::info!("roster: deleted {member_id}");
        Ok(())
    }

    /// Overwrite the whole roster. Nothing is written unless every record
    /// validates.
    pub fn replace_members(&self, members: &[TeamMember]) -> PlanResult<()> {
        for m in members {
            m.validate()?;
        }
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM team_member", [])?;
        for (position, m) in members.iter().enumerate() {
            insert_member_row(&tx, m, position as i64)?;
        }
        tx.commit()?;

        log::info!("roster: replaced with {} members", members.len());
        Ok(())
    }
}
