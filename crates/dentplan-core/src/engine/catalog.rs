//! Catalog administration: actors, patients, services, prerequisites,
//! templates and the appointments linked to items.
//!
//! None of these touch a plan, so they run in a plain transaction without the
//! plan audit buffer.

use jiff::Timestamp;
use log::info;
use rusqlite::TransactionBehavior;

use crate::{
    db::{actor_queries, appointment_queries, catalog_queries, item_queries, Database},
    error::{DatabaseResultExt, OptionExt, PlannerError, Result},
    models::{Actor, LinkedAppointment, Patient, RoleClass, Service, Template},
    params::{
        AddPrerequisite, RegisterActor, RegisterAppointment, RegisterPatient, RegisterService,
        RegisterTemplate, UpdateAppointment,
    },
    rules::access,
};

impl Database {
    /// Registers an actor.
    ///
    /// `by` may be `None` only while no active administrator exists, and then
    /// only to register the first administrator.
    pub fn register_actor(&mut self, by: Option<&Actor>, params: &RegisterActor) -> Result<Actor> {
        let role = params.validate()?;
        let tx = self.begin(TransactionBehavior::Immediate)?;

        match by {
            Some(actor) => access::authorize_admin(actor, "register actors")?,
            None => {
                if actor_queries::count_active_admins(&tx)? > 0 {
                    return Err(PlannerError::access_denied(
                        "An administrator must register new actors",
                    ));
                }
                if role != RoleClass::Admin {
                    return Err(PlannerError::access_denied(
                        "The first registered actor must be an administrator",
                    ));
                }
            }
        }
        if let Some(patient_id) = params.patient_id {
            actor_queries::select_patient(&tx, patient_id)?.or_not_found("Patient", patient_id)?;
        }

        let actor = actor_queries::insert_actor(
            &tx,
            params.name.trim(),
            role,
            params.specialization.as_deref(),
            params.patient_id,
            Timestamp::now(),
        )?;
        tx.commit().db_context("Failed to commit transaction")?;
        info!("Registered {} actor {} ({})", role.as_str(), actor.id, actor.name);
        Ok(actor)
    }

    /// Activates or deactivates an actor. Deactivated actors can no longer be
    /// resolved for requests.
    pub fn set_actor_active(&mut self, by: &Actor, actor_id: u64, active: bool) -> Result<Actor> {
        access::authorize_admin(by, "change actor status")?;
        if by.id == actor_id && !active {
            return Err(PlannerError::conflict("Administrators cannot deactivate themselves"));
        }
        let tx = self.begin(TransactionBehavior::Immediate)?;
        if !actor_queries::set_actor_active(&tx, actor_id, active)? {
            return Err(PlannerError::not_found("Actor", actor_id));
        }
        let actor = actor_queries::select_actor(&tx, actor_id)?.or_not_found("Actor", actor_id)?;
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(actor)
    }

    pub fn list_actors(&self, by: &Actor) -> Result<Vec<Actor>> {
        access::authorize_staff(by, "list actors")?;
        actor_queries::select_actors(self.connection())
    }

    pub fn register_patient(&mut self, by: &Actor, params: &RegisterPatient) -> Result<Patient> {
        access::authorize_staff(by, "register patients")?;
        if params.name.trim().is_empty() {
            return Err(PlannerError::invalid_input("name").with_reason("must not be empty"));
        }
        let tx = self.begin(TransactionBehavior::Immediate)?;
        let patient = actor_queries::insert_patient(&tx, params.name.trim(), Timestamp::now())?;
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(patient)
    }

    pub fn list_patients(&self, by: &Actor) -> Result<Vec<Patient>> {
        access::authorize_staff(by, "list patients")?;
        actor_queries::select_patients(self.connection())
    }

    pub fn register_service(&mut self, by: &Actor, params: &RegisterService) -> Result<Service> {
        access::authorize_admin(by, "manage the service catalog")?;
        params.validate()?;
        let tx = self.begin(TransactionBehavior::Immediate)?;
        if let Some(existing) = catalog_queries::select_service_by_code(&tx, &params.code)? {
            return Err(PlannerError::conflict(format!(
                "Service code {} is already used by service {}",
                existing.code, existing.id
            )));
        }
        let service = catalog_queries::insert_service(&tx, params)?;
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(service)
    }

    pub fn list_services(&self) -> Result<Vec<Service>> {
        catalog_queries::select_services(self.connection())
    }

    /// Declares that `service_id` can only be done after `prerequisite_id`.
    pub fn add_prerequisite(&mut self, by: &Actor, params: &AddPrerequisite) -> Result<()> {
        access::authorize_admin(by, "manage the service catalog")?;
        params.validate()?;
        let tx = self.begin(TransactionBehavior::Immediate)?;
        for service_id in [params.service_id, params.prerequisite_id] {
            catalog_queries::select_service(&tx, service_id)?.or_not_found("Service", service_id)?;
        }
        catalog_queries::insert_prerequisite(&tx, params.service_id, params.prerequisite_id)?;
        tx.commit().db_context("Failed to commit transaction")
    }

    pub fn register_template(&mut self, by: &Actor, params: &RegisterTemplate) -> Result<Template> {
        access::authorize_admin(by, "manage treatment templates")?;
        params.validate()?;
        let tx = self.begin(TransactionBehavior::Immediate)?;
        for item in params.phases.iter().flat_map(|phase| phase.items.iter()) {
            catalog_queries::select_service(&tx, item.service_id)?
                .or_not_found("Service", item.service_id)?;
        }
        let template_id = catalog_queries::insert_template(&tx, params, Timestamp::now())?;
        let template = catalog_queries::select_template(&tx, template_id)?
            .or_not_found("Template", template_id)?;
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(template)
    }

    pub fn list_templates(&self) -> Result<Vec<Template>> {
        catalog_queries::select_templates(self.connection())
    }

    pub fn get_template(&self, template_id: u64) -> Result<Template> {
        catalog_queries::select_template(self.connection(), template_id)?
            .or_not_found("Template", template_id)
    }

    /// Records an appointment booked against an item by the scheduling side.
    pub fn register_appointment(
        &mut self,
        by: &Actor,
        params: &RegisterAppointment,
    ) -> Result<LinkedAppointment> {
        access::authorize_staff(by, "record appointments")?;
        let status = params.validate()?;
        let tx = self.begin(TransactionBehavior::Immediate)?;
        item_queries::select_item(&tx, params.item_id)?.or_not_found("Item", params.item_id)?;
        let appointment = appointment_queries::insert_appointment(
            &tx,
            params.item_id,
            status,
            params.scheduled_at,
            Timestamp::now(),
        )?;
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(appointment)
    }

    pub fn update_appointment(
        &mut self,
        by: &Actor,
        params: &UpdateAppointment,
    ) -> Result<LinkedAppointment> {
        access::authorize_staff(by, "update appointments")?;
        let status = params.validate()?;
        let tx = self.begin(TransactionBehavior::Immediate)?;
        if !appointment_queries::set_appointment_status(&tx, params.id, status)? {
            return Err(PlannerError::not_found("Appointment", params.id));
        }
        let appointment = appointment_queries::select_appointment(&tx, params.id)?
            .or_not_found("Appointment", params.id)?;
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(appointment)
    }

    pub fn list_appointments(&self, by: &Actor, item_id: u64) -> Result<Vec<LinkedAppointment>> {
        access::authorize_staff(by, "list appointments")?;
        appointment_queries::select_appointments_for_item(self.connection(), item_id)
    }
}
