//! End-to-end walkthrough of both services.
//!
//! Creates a set of accounts with different privileges on the Information
//! Center, then exercises volume management on the Control Center with each
//! of them. Steps that a service is expected to refuse print the refusal and
//! carry on; anything else that fails stops the walkthrough.

use std::io::Write;
use std::thread;
use std::time::Duration;

use centerctl_client::{ControlCenterClient, InformationCenterClient};
use centerctl_common::endpoint::{CONTROL_CENTER_PORT, INFORMATION_CENTER_PORT};
use centerctl_common::protocol::{
    AccountType, AuthenticateAccountRequest, CenterError, CreateAccountRequest,
    CreateVolumeRequest, DeleteVolumeRequest, ErrorKind, GetVolumeRequest, ListAccountsRequest,
    ListVolumesRequest, Reply, Result, UpdateAccountRequest, WireStruct,
};
use centerctl_common::Endpoint;
use tracing::{info, warn};

use crate::output::Printer;

/// Password every demo account starts with.
pub const INITIAL_PASSWORD: &str = "123456";

/// Size of the demo volume in MiB.
pub const VOLUME_SIZE_MB: i64 = 16;

/// Volume type of the demo volume.
pub const VOLUME_TYPE: i32 = 1;

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub host: String,
    pub info_center_port: u16,
    pub control_center_port: u16,
    /// Pause after volume creation and deletion, which the Control Center
    /// completes in the background.
    pub settle: Duration,
    /// Appended to every account and volume name so reruns do not collide.
    pub seed: String,
    pub timeout: Option<Duration>,
}

impl DemoConfig {
    pub fn new(host: impl Into<String>, seed: impl Into<String>) -> Self {
        DemoConfig {
            host: host.into(),
            info_center_port: INFORMATION_CENTER_PORT,
            control_center_port: CONTROL_CENTER_PORT,
            settle: Duration::from_secs(60),
            seed: seed.into(),
            timeout: None,
        }
    }

    pub fn information_center(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.info_center_port)
    }

    pub fn control_center(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.control_center_port)
    }
}

/// What happened to the steps that were expected to be refused.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DemoReport {
    /// Methods of expected-failure steps the service did refuse.
    pub refused: Vec<String>,
    /// Methods of expected-failure steps the service let through.
    pub allowed: Vec<String>,
}

struct Accounts {
    admin: i64,
    regular1: i64,
    regular2: i64,
}

struct Demo<'a, W: Write> {
    config: &'a DemoConfig,
    info_center: InformationCenterClient,
    control_center: ControlCenterClient,
    printer: &'a mut Printer<W>,
    report: DemoReport,
}

/// Runs the walkthrough.
///
/// # Errors
///
/// Returns the first error from a step that was expected to succeed, and any
/// transport error, including one hit by an expected-failure step.
pub fn run<W: Write>(config: &DemoConfig, printer: &mut Printer<W>) -> Result<DemoReport> {
    let mut demo = Demo {
        config,
        info_center: InformationCenterClient::new(config.information_center())
            .with_timeout(config.timeout),
        control_center: ControlCenterClient::new(config.control_center())
            .with_timeout(config.timeout),
        printer,
        report: DemoReport::default(),
    };

    info!(
        "Running demo against {} and {} (seed {})",
        config.information_center(),
        config.control_center(),
        config.seed
    );

    let accounts = demo.accounts()?;
    demo.volumes(&accounts)?;

    info!(
        "Demo finished: {} refusal(s) observed, {} unexpectedly allowed",
        demo.report.refused.len(),
        demo.report.allowed.len()
    );
    Ok(demo.report)
}

impl<W: Write> Demo<'_, W> {
    fn name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.config.seed)
    }

    fn accounts(&mut self) -> Result<Accounts> {
        let ic = self.info_center.clone();

        let accounts = [
            ("Creating super admin account", "super-admin-account", AccountType::SuperAdmin),
            ("Creating admin account", "admin-account", AccountType::Admin),
            ("Creating regular account1", "regular-account1", AccountType::Regular),
            ("Creating regular account2", "regular-account2", AccountType::Regular),
        ];
        let mut ids = Vec::with_capacity(accounts.len());
        for (title, prefix, account_type) in accounts {
            ids.push(self.create_account(&ic, title, prefix, account_type)?);
        }
        let (admin, regular1, regular2) = (ids[1], ids[2], ids[3]);

        self.step(
            "Listing accounts with admin account",
            &ListAccountsRequest { account_id: admin },
            |r| ic.list_accounts(r),
        )?;
        self.refused_step(
            "Listing accounts with regular account, expect access denied",
            &ListAccountsRequest { account_id: regular1 },
            |r| ic.list_accounts(r),
        )?;

        let regular1_name = self.name("regular-account1");
        self.step(
            "Authenticating regular account",
            &AuthenticateAccountRequest {
                account_name: regular1_name.clone(),
                password: INITIAL_PASSWORD.to_string(),
            },
            |r| ic.authenticate_account(r),
        )?;
        self.refused_step(
            "Authenticating regular account with wrong password, expect failure",
            &AuthenticateAccountRequest {
                account_name: regular1_name.clone(),
                password: format!("{}wrong", INITIAL_PASSWORD),
            },
            |r| ic.authenticate_account(r),
        )?;

        self.step(
            "Updating account by owner",
            &UpdateAccountRequest {
                account_name: regular1_name.clone(),
                old_password: Some(INITIAL_PASSWORD.to_string()),
                new_password: "789012".to_string(),
                account_id: regular1,
            },
            |r| ic.update_account(r),
        )?;
        self.step(
            "Updating account by admin",
            &UpdateAccountRequest {
                account_name: regular1_name.clone(),
                old_password: None,
                new_password: "345678".to_string(),
                account_id: admin,
            },
            |r| ic.update_account(r),
        )?;
        self.refused_step(
            "Updating account by other regular user, expect access denied",
            &UpdateAccountRequest {
                account_name: regular1_name,
                old_password: Some(INITIAL_PASSWORD.to_string()),
                new_password: "789012".to_string(),
                account_id: regular2,
            },
            |r| ic.update_account(r),
        )?;

        Ok(Accounts {
            admin,
            regular1,
            regular2,
        })
    }

    fn volumes(&mut self, accounts: &Accounts) -> Result<()> {
        let cc = self.control_center.clone();

        let request = CreateVolumeRequest::with_size_mb(
            self.name("vol"),
            VOLUME_SIZE_MB,
            VOLUME_TYPE,
            accounts.regular1,
        )?;
        let created = self.step("Creating volume with regular account", &request, |r| {
            cc.create_volume(r)
        })?;
        let volume_id = created.volume_id().ok_or_else(|| {
            CenterError::Protocol("createVolume reply carries no volume id".to_string())
        })?;

        self.settle()?;

        self.step(
            "Listing volumes with regular account, expect 1 volume",
            &ListVolumesRequest { account_id: accounts.regular1 },
            |r| cc.list_volumes(r),
        )?;
        self.step(
            "Listing volumes with admin account, expect more than 1 volume",
            &ListVolumesRequest { account_id: accounts.admin },
            |r| cc.list_volumes(r),
        )?;

        let as_owner = GetVolumeRequest { volume_id, account_id: accounts.regular1 };
        self.step("Getting volume with regular account", &as_owner, |r| cc.get_volume(r))?;
        self.step(
            "Getting volume with admin account",
            &GetVolumeRequest { volume_id, account_id: accounts.admin },
            |r| cc.get_volume(r),
        )?;
        self.refused_step(
            "Getting volume with regular account2, expect access denied",
            &GetVolumeRequest { volume_id, account_id: accounts.regular2 },
            |r| cc.get_volume(r),
        )?;

        self.refused_step(
            "Deleting volume with regular account2, expect access denied",
            &DeleteVolumeRequest { volume_id, account_id: accounts.regular2 },
            |r| cc.delete_volume(r),
        )?;
        self.step(
            "Deleting volume with regular account1",
            &DeleteVolumeRequest { volume_id, account_id: accounts.regular1 },
            |r| cc.delete_volume(r),
        )?;

        self.settle()?;

        self.step("Getting volume again with regular account", &as_owner, |r| cc.get_volume(r))?;
        Ok(())
    }

    fn create_account(
        &mut self,
        ic: &InformationCenterClient,
        title: &str,
        prefix: &str,
        account_type: AccountType,
    ) -> Result<i64> {
        let request = CreateAccountRequest {
            account_name: self.name(prefix),
            password: INITIAL_PASSWORD.to_string(),
            account_type: account_type.code(),
        };
        let reply = self.step(title, &request, |r| ic.create_account(r))?;
        reply.account_id().ok_or_else(|| {
            CenterError::Protocol("createAccount reply carries no account id".to_string())
        })
    }

    fn settle(&mut self) -> Result<()> {
        if self.config.settle.is_zero() {
            return Ok(());
        }
        self.printer
            .banner(&format!("Sleeping {}s", self.config.settle.as_secs()))?;
        info!("Waiting {:?} for the Control Center to catch up", self.config.settle);
        thread::sleep(self.config.settle);
        Ok(())
    }

    /// A step that must succeed.
    fn step<R, F>(&mut self, title: &str, request: &R, call: F) -> Result<Reply>
    where
        R: WireStruct,
        F: FnOnce(&R) -> Result<Reply>,
    {
        self.printer.banner(title)?;
        info!("{}", title);
        self.printer
            .request(R::STRUCT_NAME, &serde_json::to_value(request)?)?;
        let reply = call(request)?;
        self.printer.reply(&reply)?;
        Ok(reply)
    }

    /// A step the service is expected to refuse.
    fn refused_step<R, F>(&mut self, title: &str, request: &R, call: F) -> Result<()>
    where
        R: WireStruct,
        F: FnOnce(&R) -> Result<Reply>,
    {
        self.printer.banner(title)?;
        info!("{}", title);
        self.printer
            .request(R::STRUCT_NAME, &serde_json::to_value(request)?)?;

        match call(request) {
            Ok(reply) => {
                warn!("{} was expected to be refused but succeeded", reply.method);
                self.printer.reply(&reply)?;
                self.report.allowed.push(reply.method);
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::Service => {
                warn!("Refused as expected: {}", err);
                self.printer.error(&err)?;
                let method = match &err {
                    CenterError::Service { method, .. } | CenterError::Application { method, .. } => {
                        method.clone()
                    }
                    _ => String::new(),
                };
                self.report.refused.push(method);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
