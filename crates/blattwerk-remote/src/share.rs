// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Share-link registry — issues token-addressed links to a shared file and
// enforces their expiry, access limit and optional password.
//
// Only fingerprints are kept: the SHA-256 of the shared bytes and of the
// password salted with the link token. Links persist as JSON in the data
// directory.

use std::collections::BTreeMap;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use blattwerk_core::AppConfig;
use blattwerk_core::error::{BlattwerkError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::integrity::{hash_bytes, matches_salted_hash, salted_hash};

/// File name of the persisted registry inside the data directory.
pub const SHARES_FILE: &str = "shares.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Download,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub file_name: String,
    /// Base64-encoded file bytes.
    pub file_data: String,
    pub permissions: Vec<Permission>,
    /// Falls back to the registry default when absent.
    #[serde(default)]
    pub expiry_days: Option<u32>,
    #[serde(default)]
    pub max_access: Option<u32>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email_recipients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub success: bool,
    pub share_url: String,
    pub share_token: Uuid,
    pub expires_at: DateTime<Utc>,
    pub permissions: Vec<Permission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_access: Option<u32>,
}

/// What the registry remembers about one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub file_name: String,
    pub file_size: usize,
    pub file_sha256: String,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub max_access: Option<u32>,
    /// SHA-256 of the link token followed by the password.
    pub password_hash: Option<String>,
    pub access_count: u32,
}

impl ShareRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Result of a granted access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareAccess {
    pub file_name: String,
    pub file_sha256: String,
    pub permissions: Vec<Permission>,
    pub access_count: u32,
    /// Opens left before the limit, when one is set.
    pub remaining: Option<u32>,
}

/// Issued share links keyed by token.
#[derive(Debug, Clone)]
pub struct ShareRegistry {
    origin: String,
    default_expiry_days: u32,
    links: BTreeMap<Uuid, ShareRecord>,
}

impl ShareRegistry {
    pub fn new(origin: impl Into<String>, default_expiry_days: u32) -> Self {
        Self {
            origin: origin.into(),
            default_expiry_days,
            links: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.share_origin.clone(), config.default_expiry_days)
    }

    // -- Persistence ------------------------------------------------------------

    /// Load links stored in `data_dir`, starting empty when none are stored.
    pub fn open(config: &AppConfig, data_dir: &Path) -> Result<Self> {
        let mut registry = Self::from_config(config);
        let path = data_dir.join(SHARES_FILE);
        match std::fs::read_to_string(&path) {
            Ok(data) => {
                registry.links = serde_json::from_str(&data)?;
                debug!(links = registry.links.len(), "share registry loaded");
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no share registry yet");
            }
            Err(err) => return Err(err.into()),
        }
        Ok(registry)
    }

    /// Write all links as pretty JSON into `data_dir`.
    pub fn persist(&self, data_dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.links)?;
        std::fs::write(data_dir.join(SHARES_FILE), json)?;
        Ok(())
    }

    // -- Links ------------------------------------------------------------------

    pub fn issue_now(&mut self, request: ShareRequest) -> Result<ShareResponse> {
        self.issue(request, Utc::now())
    }

    /// Register a new link for `request`, valid from `now`.
    #[instrument(skip_all, fields(file = %request.file_name))]
    pub fn issue(&mut self, request: ShareRequest, now: DateTime<Utc>) -> Result<ShareResponse> {
        let expiry_days = request.expiry_days.unwrap_or(self.default_expiry_days);
        if expiry_days == 0 {
            return Err(BlattwerkError::Validation(
                "share links must stay valid for at least one day".into(),
            ));
        }
        if request.max_access == Some(0) {
            return Err(BlattwerkError::Validation(
                "an access limit of zero would make the link unusable".into(),
            ));
        }
        let expires_at = TimeDelta::try_days(i64::from(expiry_days))
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or_else(|| {
                BlattwerkError::Validation(format!("expiry of {expiry_days} days is out of range"))
            })?;

        let data = BASE64.decode(request.file_data.trim()).map_err(|err| {
            BlattwerkError::Validation(format!("file data is not valid base64: {err}"))
        })?;

        let token = Uuid::new_v4();
        let record = ShareRecord {
            file_name: request.file_name,
            file_size: data.len(),
            file_sha256: hash_bytes(&data),
            permissions: request.permissions.clone(),
            created_at: now,
            expires_at,
            max_access: request.max_access,
            password_hash: request
                .password
                .filter(|password| !password.is_empty())
                .map(|password| salted_hash(token.as_bytes(), password.as_bytes())),
            access_count: 0,
        };

        if !request.email_recipients.is_empty() {
            // Notification delivery is out of scope; recipients are only logged.
            info!(recipients = ?request.email_recipients, "share notification requested");
        }
        info!(%token, %expires_at, protected = record.password_hash.is_some(), "share link issued");
        self.links.insert(token, record);

        Ok(ShareResponse {
            success: true,
            share_url: format!("{}/share/{token}", self.origin.trim_end_matches('/')),
            share_token: token,
            expires_at,
            permissions: request.permissions,
            max_access: request.max_access,
        })
    }

    /// Open the link `token`, counting the access when it is allowed.
    pub fn access(
        &mut self,
        token: Uuid,
        password: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ShareAccess> {
        let record = self
            .links
            .get_mut(&token)
            .ok_or_else(|| BlattwerkError::ShareNotFound(token.to_string()))?;

        if record.is_expired(now) {
            return Err(BlattwerkError::ShareExpired(record.expires_at.to_rfc3339()));
        }
        if let Some(expected) = &record.password_hash {
            let given = password.unwrap_or_default();
            if !matches_salted_hash(token.as_bytes(), given.as_bytes(), expected) {
                warn!(%token, "share access with wrong password");
                return Err(BlattwerkError::PasswordRejected);
            }
        }
        if let Some(limit) = record.max_access {
            if record.access_count >= limit {
                return Err(BlattwerkError::AccessLimitReached(limit));
            }
        }

        record.access_count += 1;
        debug!(%token, count = record.access_count, "share link opened");
        Ok(ShareAccess {
            file_name: record.file_name.clone(),
            file_sha256: record.file_sha256.clone(),
            permissions: record.permissions.clone(),
            access_count: record.access_count,
            remaining: record
                .max_access
                .map(|limit| limit.saturating_sub(record.access_count)),
        })
    }

    pub fn revoke(&mut self, token: Uuid) -> Result<ShareRecord> {
        let record = self
            .links
            .remove(&token)
            .ok_or_else(|| BlattwerkError::ShareNotFound(token.to_string()))?;
        info!(%token, "share link revoked");
        Ok(record)
    }

    /// Drop every link expired at `now`, returning how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.links.len();
        self.links.retain(|_, record| !record.is_expired(now));
        before - self.links.len()
    }

    pub fn get(&self, token: Uuid) -> Option<&ShareRecord> {
        self.links.get(&token)
    }

    pub fn links(&self) -> impl Iterator<Item = (&Uuid, &ShareRecord)> {
        self.links.iter()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
