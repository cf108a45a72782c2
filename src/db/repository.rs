//! Repository layer: all SQL lives here.
//!
//! Commissions are addressed by the pair (numActa, dataComissio). Details and
//! expedients are matched to their parent by acta number plus the year suffix
//! of the session date, so a summary whose date moved within the same year
//! still finds its detail.

use chrono::{Local, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{dates, merge};
use crate::errors::AppError;
use crate::models::{
    AdminData, AdminItem, AdminListKey, ApplicationData, BackupRecord, CommissionDetail,
    CommissionStatus, CommissionSummary, CreateAdminItemRequest, CreateUserRequest,
    DeletedCommission, Expedient, PatchCommissionRequest, Role, UpdateAdminItemRequest,
    UpdateUserRequest, User, DEFAULT_HORA, DEFAULT_MITJA, IMPORT_DEFAULT_PASSWORD,
    MASTER_USER_ID,
};

use super::seed_admin_data;

/// SQL LIKE pattern matching any D/M/YYYY date in the same year as `date_str`.
fn year_pattern(date_str: &str) -> String {
    match date_str.rsplit('/').next() {
        Some(year) => format!("%/{year}"),
        None => date_str.to_string(),
    }
}

#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---- commissions ----

    /// All commissions, ordered by session date then acta number.
    pub async fn list_commissions(&self) -> Result<Vec<CommissionSummary>, AppError> {
        let rows = sqlx::query("SELECT * FROM commissions")
            .fetch_all(&self.pool)
            .await?;
        let mut commissions: Vec<CommissionSummary> =
            rows.iter().map(summary_from_row).collect();
        commissions.sort_by_key(|c| (dates::parse_dmy(&c.data_comissio), c.num_acta));
        Ok(commissions)
    }

    pub async fn get_commission(
        &self,
        num_acta: i64,
        data_comissio: &str,
    ) -> Result<Option<CommissionSummary>, AppError> {
        let row = sqlx::query("SELECT * FROM commissions WHERE num_acta = ? AND data_comissio = ?")
            .bind(num_acta)
            .bind(data_comissio)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(summary_from_row))
    }

    /// Create a commission with default state. The acta number must be free
    /// within the session's calendar year.
    pub async fn create_commission(
        &self,
        num_acta: i64,
        data_comissio: &str,
    ) -> Result<CommissionSummary, AppError> {
        let duplicate =
            sqlx::query("SELECT 1 FROM commissions WHERE num_acta = ? AND data_comissio LIKE ?")
                .bind(num_acta)
                .bind(year_pattern(data_comissio))
                .fetch_optional(&self.pool)
                .await?;
        if duplicate.is_some() {
            return Err(AppError::Validation(format!(
                "Ja existeix una comissió amb l'acta {num_acta} en aquest any"
            )));
        }

        let commission = CommissionSummary {
            num_acta,
            num_temes: 0,
            dia_setmana: dates::weekday_catalan(data_comissio),
            data_comissio: data_comissio.to_string(),
            avis_email: false,
            data_email: None,
            estat: CommissionStatus::Oberta,
        };
        self.insert_summary(&commission).await?;
        Ok(commission)
    }

    async fn insert_summary(&self, c: &CommissionSummary) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO commissions (num_acta, data_comissio, num_temes, dia_setmana, avis_email, data_email, estat)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(c.num_acta)
        .bind(&c.data_comissio)
        .bind(c.num_temes)
        .bind(&c.dia_setmana)
        .bind(c.avis_email)
        .bind(&c.data_email)
        .bind(c.estat.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a batch of generated commissions in one transaction.
    pub async fn add_commissions(
        &self,
        commissions: &[CommissionSummary],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for c in commissions {
            sqlx::query(
                r#"
                INSERT INTO commissions (num_acta, data_comissio, num_temes, dia_setmana, avis_email, data_email, estat)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(c.num_acta)
            .bind(&c.data_comissio)
            .bind(c.num_temes)
            .bind(&c.dia_setmana)
            .bind(c.avis_email)
            .bind(&c.data_email)
            .bind(c.estat.as_str())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Change a commission's key (acta number and/or date), cascading the new
    /// key to its detail and expedients.
    pub async fn rekey_commission(
        &self,
        num_acta: i64,
        data_comissio: &str,
        new_num_acta: i64,
        new_data_comissio: &str,
    ) -> Result<CommissionSummary, AppError> {
        let existing = self
            .get_commission(num_acta, data_comissio)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Commission {num_acta} not found")))?;

        let key_changed = new_num_acta != num_acta || new_data_comissio != data_comissio;
        if key_changed {
            let clash = sqlx::query(
                r#"
                SELECT 1 FROM commissions
                WHERE num_acta = ? AND data_comissio LIKE ?
                  AND NOT (num_acta = ? AND data_comissio = ?)
                "#,
            )
            .bind(new_num_acta)
            .bind(year_pattern(new_data_comissio))
            .bind(num_acta)
            .bind(data_comissio)
            .fetch_optional(&self.pool)
            .await?;
            if clash.is_some() {
                return Err(AppError::Validation(format!(
                    "Ja existeix una comissió amb l'acta {new_num_acta} en aquest any"
                )));
            }
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            UPDATE commissions SET num_acta = ?, data_comissio = ?, dia_setmana = ?
            WHERE num_acta = ? AND data_comissio = ?
            "#,
        )
        .bind(new_num_acta)
        .bind(new_data_comissio)
        .bind(dates::weekday_catalan(new_data_comissio))
        .bind(num_acta)
        .bind(data_comissio)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE commission_details SET num_acta = ?, sessio = ? WHERE num_acta = ? AND sessio LIKE ?",
        )
        .bind(new_num_acta)
        .bind(new_data_comissio)
        .bind(num_acta)
        .bind(year_pattern(data_comissio))
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE expedients SET num_acta = ?, sessio = ? WHERE num_acta = ? AND sessio LIKE ?",
        )
        .bind(new_num_acta)
        .bind(new_data_comissio)
        .bind(num_acta)
        .bind(year_pattern(data_comissio))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(CommissionSummary {
            num_acta: new_num_acta,
            data_comissio: new_data_comissio.to_string(),
            dia_setmana: dates::weekday_catalan(new_data_comissio),
            ..existing
        })
    }

    /// Apply a partial update. Clearing avisEmail also clears dataEmail.
    pub async fn patch_commission(
        &self,
        num_acta: i64,
        data_comissio: &str,
        patch: &PatchCommissionRequest,
    ) -> Result<CommissionSummary, AppError> {
        let mut commission = self
            .get_commission(num_acta, data_comissio)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Commission {num_acta} not found")))?;

        if let Some(num_temes) = patch.num_temes {
            commission.num_temes = num_temes;
        }
        if let Some(avis_email) = patch.avis_email {
            commission.avis_email = avis_email;
            if !avis_email {
                commission.data_email = None;
            }
        }
        if let Some(data_email) = &patch.data_email {
            commission.data_email = data_email.clone();
        }
        if let Some(estat) = patch.estat {
            commission.estat = estat;
        }

        self.store_summary_fields(&commission).await?;
        Ok(commission)
    }

    /// Mark the convocation email as sent today.
    pub async fn mark_commission_sent(
        &self,
        num_acta: i64,
        data_comissio: &str,
    ) -> Result<CommissionSummary, AppError> {
        let mut commission = self
            .get_commission(num_acta, data_comissio)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Commission {num_acta} not found")))?;
        commission.avis_email = true;
        commission.data_email = Some(dates::today_dmy());
        self.store_summary_fields(&commission).await?;
        Ok(commission)
    }

    async fn store_summary_fields(&self, c: &CommissionSummary) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE commissions
            SET num_temes = ?, avis_email = ?, data_email = ?, estat = ?
            WHERE num_acta = ? AND data_comissio = ?
            "#,
        )
        .bind(c.num_temes)
        .bind(c.avis_email)
        .bind(&c.data_email)
        .bind(c.estat.as_str())
        .bind(c.num_acta)
        .bind(&c.data_comissio)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Commission {} not found",
                c.num_acta
            )));
        }
        Ok(())
    }

    /// Delete a commission with its detail and expedients, returning the
    /// removed records so the caller can offer an undo.
    pub async fn delete_commission(
        &self,
        num_acta: i64,
        data_comissio: &str,
    ) -> Result<DeletedCommission, AppError> {
        let commission = self
            .get_commission(num_acta, data_comissio)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Commission {num_acta} not found")))?;
        let detail = self.stored_detail(num_acta, data_comissio).await?;

        let pattern = year_pattern(data_comissio);
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM expedients WHERE num_acta = ? AND sessio LIKE ?")
            .bind(num_acta)
            .bind(&pattern)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM commission_details WHERE num_acta = ? AND sessio LIKE ?")
            .bind(num_acta)
            .bind(&pattern)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM commissions WHERE num_acta = ? AND data_comissio = ?")
            .bind(num_acta)
            .bind(data_comissio)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(DeletedCommission {
            summary: commission,
            detail,
        })
    }

    /// Reinsert a previously deleted commission, detail included.
    pub async fn restore_commission(
        &self,
        payload: &DeletedCommission,
    ) -> Result<CommissionSummary, AppError> {
        let c = &payload.summary;
        let clash =
            sqlx::query("SELECT 1 FROM commissions WHERE num_acta = ? AND data_comissio LIKE ?")
                .bind(c.num_acta)
                .bind(year_pattern(&c.data_comissio))
                .fetch_optional(&self.pool)
                .await?;
        if clash.is_some() {
            return Err(AppError::Validation(format!(
                "Ja existeix una comissió amb l'acta {} en aquest any",
                c.num_acta
            )));
        }

        let mut tx = self.pool.begin().await?;
        insert_summary_tx(&mut tx, c).await?;
        if let Some(detail) = &payload.detail {
            insert_detail_tx(&mut tx, detail).await?;
        }
        tx.commit().await?;
        Ok(c.clone())
    }

    // ---- commission details ----

    /// The detail stored for an acta in the year of `data_comissio`, if any.
    async fn stored_detail(
        &self,
        num_acta: i64,
        data_comissio: &str,
    ) -> Result<Option<CommissionDetail>, AppError> {
        let pattern = year_pattern(data_comissio);
        let row =
            sqlx::query("SELECT * FROM commission_details WHERE num_acta = ? AND sessio LIKE ?")
                .bind(num_acta)
                .bind(&pattern)
                .fetch_optional(&self.pool)
                .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let expedient_rows = sqlx::query(
            "SELECT * FROM expedients WHERE num_acta = ? AND sessio LIKE ? ORDER BY ordre",
        )
        .bind(num_acta)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(detail_from_row(
            &row,
            expedient_rows.iter().map(expedient_from_row).collect(),
        )))
    }

    /// Fetch a session's detail. An open commission without a stored detail
    /// yields a synthesized empty one; it is not persisted until saved.
    pub async fn get_commission_detail(
        &self,
        num_acta: i64,
        data_comissio: &str,
    ) -> Result<Option<CommissionDetail>, AppError> {
        if let Some(detail) = self.stored_detail(num_acta, data_comissio).await? {
            return Ok(Some(detail));
        }

        let Some(commission) = self.get_commission(num_acta, data_comissio).await? else {
            return Ok(None);
        };
        if commission.estat != CommissionStatus::Oberta {
            return Ok(None);
        }
        Ok(Some(CommissionDetail {
            num_acta,
            sessio: commission.data_comissio,
            data_actual: dates::today_dmy(),
            hora: DEFAULT_HORA.to_string(),
            estat: CommissionStatus::Oberta,
            mitja: DEFAULT_MITJA.to_string(),
            expedients_count: 0,
            expedients: Vec::new(),
        }))
    }

    /// All stored details with their expedients.
    pub async fn list_all_details(&self) -> Result<Vec<CommissionDetail>, AppError> {
        let detail_rows = sqlx::query("SELECT * FROM commission_details ORDER BY num_acta")
            .fetch_all(&self.pool)
            .await?;
        let expedient_rows =
            sqlx::query("SELECT * FROM expedients ORDER BY num_acta, sessio, ordre")
                .fetch_all(&self.pool)
                .await?;

        let mut details = Vec::with_capacity(detail_rows.len());
        for row in &detail_rows {
            let num_acta: i64 = row.get("num_acta");
            let sessio: String = row.get("sessio");
            let expedients = expedient_rows
                .iter()
                .filter(|e| {
                    e.get::<i64, _>("num_acta") == num_acta
                        && e.get::<String, _>("sessio") == sessio
                })
                .map(expedient_from_row)
                .collect();
            details.push(detail_from_row(row, expedients));
        }
        Ok(details)
    }

    /// Upsert a session detail and replace its expedient list, keeping the
    /// parent summary (numTemes, date, state, weekday) in sync.
    pub async fn save_commission_detail(
        &self,
        detail: &CommissionDetail,
    ) -> Result<CommissionDetail, AppError> {
        let pattern = year_pattern(&detail.sessio);
        let expedients_count = detail.expedients.len() as i64;

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE commission_details
            SET sessio = ?, data_actual = ?, hora = ?, estat = ?, mitja = ?, expedients_count = ?
            WHERE num_acta = ? AND sessio LIKE ?
            "#,
        )
        .bind(&detail.sessio)
        .bind(&detail.data_actual)
        .bind(&detail.hora)
        .bind(detail.estat.as_str())
        .bind(&detail.mitja)
        .bind(expedients_count)
        .bind(detail.num_acta)
        .bind(&pattern)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            sqlx::query(
                r#"
                INSERT INTO commission_details (num_acta, sessio, data_actual, hora, estat, mitja, expedients_count)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(detail.num_acta)
            .bind(&detail.sessio)
            .bind(&detail.data_actual)
            .bind(&detail.hora)
            .bind(detail.estat.as_str())
            .bind(&detail.mitja)
            .bind(expedients_count)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM expedients WHERE num_acta = ? AND sessio LIKE ?")
            .bind(detail.num_acta)
            .bind(&pattern)
            .execute(&mut *tx)
            .await?;
        insert_expedients_tx(&mut tx, detail.num_acta, &detail.sessio, &detail.expedients)
            .await?;

        sqlx::query(
            r#"
            UPDATE commissions
            SET num_temes = ?, data_comissio = ?, dia_setmana = ?, estat = ?
            WHERE num_acta = ? AND data_comissio LIKE ?
            "#,
        )
        .bind(expedients_count)
        .bind(&detail.sessio)
        .bind(dates::weekday_catalan(&detail.sessio))
        .bind(detail.estat.as_str())
        .bind(detail.num_acta)
        .bind(&pattern)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CommissionDetail {
            expedients_count,
            ..detail.clone()
        })
    }

    // ---- admin reference lists ----

    pub async fn list_admin_items(&self, key: AdminListKey) -> Result<Vec<AdminItem>, AppError> {
        let rows = sqlx::query("SELECT * FROM admin_items WHERE list = ? ORDER BY rowid")
            .bind(key.table_key())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(admin_item_from_row).collect())
    }

    /// All reference lists plus the user roster.
    pub async fn get_admin_data(&self) -> Result<AdminData, AppError> {
        Ok(AdminData {
            procediments: self.list_admin_items(AdminListKey::Procediments).await?,
            sentit_informes: self.list_admin_items(AdminListKey::SentitInformes).await?,
            tecnics: self.list_admin_items(AdminListKey::Tecnics).await?,
            departaments: self.list_admin_items(AdminListKey::Departaments).await?,
            regidors: self.list_admin_items(AdminListKey::Regidors).await?,
            users: self.list_users().await?,
        })
    }

    pub async fn create_admin_item(
        &self,
        key: AdminListKey,
        request: &CreateAdminItemRequest,
    ) -> Result<AdminItem, AppError> {
        let item = AdminItem {
            id: Uuid::new_v4().to_string(),
            name: request.name.clone(),
            email: request.email.clone(),
        };
        sqlx::query("INSERT INTO admin_items (list, id, name, email) VALUES (?, ?, ?, ?)")
            .bind(key.table_key())
            .bind(&item.id)
            .bind(&item.name)
            .bind(&item.email)
            .execute(&self.pool)
            .await?;
        Ok(item)
    }

    pub async fn update_admin_item(
        &self,
        key: AdminListKey,
        id: &str,
        request: &UpdateAdminItemRequest,
    ) -> Result<AdminItem, AppError> {
        let result =
            sqlx::query("UPDATE admin_items SET name = ?, email = ? WHERE list = ? AND id = ?")
                .bind(&request.name)
                .bind(&request.email)
                .bind(key.table_key())
                .bind(id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item {id} not found")));
        }
        Ok(AdminItem {
            id: id.to_string(),
            name: request.name.clone(),
            email: request.email.clone(),
        })
    }

    /// Delete an item, returning it so the caller can offer an undo.
    pub async fn delete_admin_item(
        &self,
        key: AdminListKey,
        id: &str,
    ) -> Result<AdminItem, AppError> {
        let row = sqlx::query("SELECT * FROM admin_items WHERE list = ? AND id = ?")
            .bind(key.table_key())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item {id} not found")))?;
        let item = admin_item_from_row(&row);

        sqlx::query("DELETE FROM admin_items WHERE list = ? AND id = ?")
            .bind(key.table_key())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(item)
    }

    /// Reinsert a previously deleted item with its original id.
    pub async fn restore_admin_item(
        &self,
        key: AdminListKey,
        item: &AdminItem,
    ) -> Result<AdminItem, AppError> {
        sqlx::query("INSERT OR REPLACE INTO admin_items (list, id, name, email) VALUES (?, ?, ?, ?)")
            .bind(key.table_key())
            .bind(&item.id)
            .bind(&item.name)
            .bind(&item.email)
            .execute(&self.pool)
            .await?;
        Ok(item.clone())
    }

    /// Merge imported items into a list. Returns the resulting list and
    /// whether anything actually changed.
    pub async fn import_admin_items(
        &self,
        key: AdminListKey,
        incoming: Vec<AdminItem>,
    ) -> Result<(Vec<AdminItem>, bool), AppError> {
        let existing = self.list_admin_items(key).await?;
        let outcome = merge::merge_admin_items(&existing, incoming);
        if !outcome.changed {
            return Ok((outcome.records, false));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM admin_items WHERE list = ?")
            .bind(key.table_key())
            .execute(&mut *tx)
            .await?;
        insert_admin_items_tx(&mut tx, key, &outcome.records).await?;
        tx.commit().await?;
        Ok((outcome.records, true))
    }

    // ---- users ----

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, AppError> {
        let password = match &request.password {
            Some(p) if !p.is_empty() => p.clone(),
            _ => IMPORT_DEFAULT_PASSWORD.to_string(),
        };
        let user = User {
            id: format!("user-{}", Uuid::new_v4()),
            name: request.name.clone(),
            email: request.email.clone(),
            password: Some(password),
            role: request.role,
        };
        sqlx::query("INSERT INTO users (id, name, email, password, role) VALUES (?, ?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn update_user(
        &self,
        id: &str,
        request: &UpdateUserRequest,
    ) -> Result<User, AppError> {
        if id == MASTER_USER_ID && request.role != Role::Admin {
            return Err(AppError::Validation(
                "El rol de l'usuari mestre no es pot canviar".to_string(),
            ));
        }

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
        let current = user_from_row(&row);

        let password = match &request.password {
            Some(p) if !p.is_empty() => Some(p.clone()),
            _ => current.password,
        };
        let user = User {
            id: id.to_string(),
            name: request.name.clone(),
            email: request.email.clone(),
            password,
            role: request.role,
        };
        sqlx::query("UPDATE users SET name = ?, email = ?, password = ?, role = ? WHERE id = ?")
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.role.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(user)
    }

    /// Delete a user, returning the removed record. The master account is
    /// protected.
    pub async fn delete_user(&self, id: &str) -> Result<User, AppError> {
        if id == MASTER_USER_ID {
            return Err(AppError::Validation(
                "L'usuari mestre no es pot eliminar".to_string(),
            ));
        }
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
        let user = user_from_row(&row);

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(user)
    }

    /// Reinsert a previously deleted user with its original id. The master
    /// account cannot be overwritten this way.
    pub async fn restore_user(&self, user: &User) -> Result<User, AppError> {
        if user.id == MASTER_USER_ID {
            return Err(AppError::Validation(
                "L'usuari mestre no es pot restaurar".to_string(),
            ));
        }
        sqlx::query(
            "INSERT OR REPLACE INTO users (id, name, email, password, role) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(user.clone())
    }

    /// Merge imported users into the roster. Returns the resulting roster and
    /// whether anything actually changed.
    pub async fn import_users(
        &self,
        incoming: Vec<User>,
    ) -> Result<(Vec<User>, bool), AppError> {
        let existing = self.list_users().await?;
        let outcome = merge::merge_users(&existing, incoming);
        if !outcome.changed {
            return Ok((outcome.records, false));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
        insert_users_tx(&mut tx, &outcome.records).await?;
        tx.commit().await?;
        Ok((outcome.records, true))
    }

    // ---- application data ----

    /// Full snapshot of the store.
    pub async fn get_application_data(&self) -> Result<ApplicationData, AppError> {
        Ok(ApplicationData {
            commissions: self.list_commissions().await?,
            commission_details: self.list_all_details().await?,
            admin_data: Some(self.get_admin_data().await?),
        })
    }

    /// Replace the entire store with an imported snapshot. Backups survive.
    /// A snapshot without admin data falls back to the seed lists.
    pub async fn replace_application_data(
        &self,
        data: &ApplicationData,
    ) -> Result<ApplicationData, AppError> {
        let admin_data = match &data.admin_data {
            Some(admin) => admin.clone(),
            None => seed_admin_data(),
        };

        let mut tx = self.pool.begin().await?;
        for table in [
            "expedients",
            "commission_details",
            "commissions",
            "admin_items",
            "users",
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }

        for commission in &data.commissions {
            insert_summary_tx(&mut tx, commission).await?;
        }
        for detail in &data.commission_details {
            insert_detail_tx(&mut tx, detail).await?;
        }
        for key in AdminListKey::ALL {
            insert_admin_items_tx(&mut tx, key, admin_data.list(key)).await?;
        }
        insert_users_tx(&mut tx, &admin_data.users).await?;
        tx.commit().await?;

        Ok(ApplicationData {
            commissions: data.commissions.clone(),
            commission_details: data.commission_details.clone(),
            admin_data: Some(admin_data),
        })
    }

    /// Seed the reference lists and default users if the store is empty.
    /// Returns whether seeding happened.
    pub async fn seed_if_empty(&self) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(false);
        }

        let seed = seed_admin_data();
        let mut tx = self.pool.begin().await?;
        for key in AdminListKey::ALL {
            insert_admin_items_tx(&mut tx, key, seed.list(key)).await?;
        }
        insert_users_tx(&mut tx, &seed.users).await?;
        tx.commit().await?;
        Ok(true)
    }

    // ---- backups ----

    /// Backup index, newest first.
    pub async fn list_backups(&self) -> Result<Vec<BackupRecord>, AppError> {
        let rows = sqlx::query("SELECT * FROM backups ORDER BY timestamp DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|row| BackupRecord {
                timestamp: row.get("timestamp"),
                description: row.get("description"),
            })
            .collect())
    }

    /// Snapshot the current store. Index entry and blob are written in one
    /// transaction so the list never shows a backup without its data.
    pub async fn create_backup(
        &self,
        description: Option<String>,
    ) -> Result<BackupRecord, AppError> {
        let data = self.get_application_data().await?;
        let snapshot = serde_json::to_string(&data)
            .map_err(|e| AppError::Internal(format!("failed to serialize snapshot: {e}")))?;

        let record = BackupRecord {
            timestamp: Utc::now().timestamp_millis(),
            description: description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| dates::format_local_timestamp(Local::now())),
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO backups (timestamp, description) VALUES (?, ?)")
            .bind(record.timestamp)
            .bind(&record.description)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO backup_blobs (timestamp, snapshot) VALUES (?, ?)")
            .bind(record.timestamp)
            .bind(&snapshot)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Replace the store with a stored snapshot.
    pub async fn restore_backup(&self, timestamp: i64) -> Result<ApplicationData, AppError> {
        let snapshot: String =
            sqlx::query_scalar("SELECT snapshot FROM backup_blobs WHERE timestamp = ?")
                .bind(timestamp)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Backup {timestamp} not found")))?;

        let data: ApplicationData = serde_json::from_str(&snapshot)
            .map_err(|e| AppError::Internal(format!("corrupt backup snapshot: {e}")))?;
        self.replace_application_data(&data).await
    }

    pub async fn delete_backup(&self, timestamp: i64) -> Result<BackupRecord, AppError> {
        let row = sqlx::query("SELECT * FROM backups WHERE timestamp = ?")
            .bind(timestamp)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Backup {timestamp} not found")))?;
        let record = BackupRecord {
            timestamp: row.get("timestamp"),
            description: row.get("description"),
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM backup_blobs WHERE timestamp = ?")
            .bind(timestamp)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM backups WHERE timestamp = ?")
            .bind(timestamp)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(record)
    }
}

// ---- transaction helpers ----

async fn insert_summary_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    c: &CommissionSummary,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO commissions (num_acta, data_comissio, num_temes, dia_setmana, avis_email, data_email, estat)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(c.num_acta)
    .bind(&c.data_comissio)
    .bind(c.num_temes)
    .bind(&c.dia_setmana)
    .bind(c.avis_email)
    .bind(&c.data_email)
    .bind(c.estat.as_str())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_detail_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    detail: &CommissionDetail,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO commission_details (num_acta, sessio, data_actual, hora, estat, mitja, expedients_count)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(detail.num_acta)
    .bind(&detail.sessio)
    .bind(&detail.data_actual)
    .bind(&detail.hora)
    .bind(detail.estat.as_str())
    .bind(&detail.mitja)
    .bind(detail.expedients.len() as i64)
    .execute(&mut **tx)
    .await?;
    insert_expedients_tx(tx, detail.num_acta, &detail.sessio, &detail.expedients).await
}

async fn insert_expedients_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    num_acta: i64,
    sessio: &str,
    expedients: &[Expedient],
) -> Result<(), AppError> {
    for (ordre, e) in expedients.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO expedients (num_acta, sessio, ordre, id, peticionari, procediment, descripcio, indret, sentit_informe, tecnic, departament)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(num_acta)
        .bind(sessio)
        .bind(ordre as i64)
        .bind(&e.id)
        .bind(&e.peticionari)
        .bind(&e.procediment)
        .bind(&e.descripcio)
        .bind(&e.indret)
        .bind(&e.sentit_informe)
        .bind(&e.tecnic)
        .bind(&e.departament)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn insert_admin_items_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    key: AdminListKey,
    items: &[AdminItem],
) -> Result<(), AppError> {
    for item in items {
        sqlx::query("INSERT INTO admin_items (list, id, name, email) VALUES (?, ?, ?, ?)")
            .bind(key.table_key())
            .bind(&item.id)
            .bind(&item.name)
            .bind(&item.email)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn insert_users_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    users: &[User],
) -> Result<(), AppError> {
    for user in users {
        sqlx::query("INSERT INTO users (id, name, email, password, role) VALUES (?, ?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.role.as_str())
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

// ---- row mappers ----

fn summary_from_row(row: &SqliteRow) -> CommissionSummary {
    CommissionSummary {
        num_acta: row.get("num_acta"),
        num_temes: row.get("num_temes"),
        dia_setmana: row.get("dia_setmana"),
        data_comissio: row.get("data_comissio"),
        avis_email: row.get("avis_email"),
        data_email: row.get("data_email"),
        estat: status_from_column(row),
    }
}

fn detail_from_row(row: &SqliteRow, expedients: Vec<Expedient>) -> CommissionDetail {
    CommissionDetail {
        num_acta: row.get("num_acta"),
        sessio: row.get("sessio"),
        data_actual: row.get("data_actual"),
        hora: row.get("hora"),
        estat: status_from_column(row),
        mitja: row.get("mitja"),
        expedients_count: row.get("expedients_count"),
        expedients,
    }
}

fn expedient_from_row(row: &SqliteRow) -> Expedient {
    Expedient {
        id: row.get("id"),
        peticionari: row.get("peticionari"),
        procediment: row.get("procediment"),
        descripcio: row.get("descripcio"),
        indret: row.get("indret"),
        sentit_informe: row.get("sentit_informe"),
        tecnic: row.get("tecnic"),
        departament: row.get("departament"),
    }
}

fn admin_item_from_row(row: &SqliteRow) -> AdminItem {
    AdminItem {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    }
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password: row.get("password"),
        role: Role::parse_or_viewer(&row.get::<String, _>("role")),
    }
}

fn status_from_column(row: &SqliteRow) -> CommissionStatus {
    CommissionStatus::from_str(&row.get::<String, _>("estat")).unwrap_or(CommissionStatus::Oberta)
}
