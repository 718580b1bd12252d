//! Catalog and account operations for the Planner.

use super::Planner;
use crate::{
    display::{Actors, Appointments, Patients, Services, Templates},
    error::Result,
    models::{Actor, LinkedAppointment, Patient, Service, Template},
    params::{
        AddPrerequisite, Id, RegisterActor, RegisterAppointment, RegisterPatient,
        RegisterService, RegisterTemplate, UpdateAppointment,
    },
};

impl Planner {
    /// Registers an actor.
    ///
    /// With `by = None` this bootstraps the first administrator and fails once
    /// an active administrator exists.
    pub async fn register_actor(&self, by: Option<&Actor>, params: &RegisterActor) -> Result<Actor> {
        let by = by.cloned();
        let params = params.clone();
        self.run(move |db, _| db.register_actor(by.as_ref(), &params))
            .await
    }

    pub async fn set_actor_active(&self, by: &Actor, actor_id: u64, active: bool) -> Result<Actor> {
        let by = by.clone();
        self.run(move |db, _| db.set_actor_active(&by, actor_id, active))
            .await
    }

    pub async fn list_actors(&self, by: &Actor) -> Result<Actors> {
        let by = by.clone();
        let actors = self.run(move |db, _| db.list_actors(&by)).await?;
        Ok(Actors(actors))
    }

    pub async fn register_patient(&self, by: &Actor, params: &RegisterPatient) -> Result<Patient> {
        let by = by.clone();
        let params = params.clone();
        self.run(move |db, _| db.register_patient(&by, &params))
            .await
    }

    pub async fn list_patients(&self, by: &Actor) -> Result<Patients> {
        let by = by.clone();
        let patients = self.run(move |db, _| db.list_patients(&by)).await?;
        Ok(Patients(patients))
    }

    pub async fn register_service(&self, by: &Actor, params: &RegisterService) -> Result<Service> {
        let by = by.clone();
        let params = params.clone();
        self.run(move |db, _| db.register_service(&by, &params))
            .await
    }

    pub async fn list_services(&self) -> Result<Services> {
        let services = self.run(|db, _| db.list_services()).await?;
        Ok(Services(services))
    }

    /// Records that one service must be completed before another.
    pub async fn add_prerequisite(&self, by: &Actor, params: &AddPrerequisite) -> Result<()> {
        let by = by.clone();
        let params = params.clone();
        self.run(move |db, _| db.add_prerequisite(&by, &params))
            .await
    }

    pub async fn register_template(&self, by: &Actor, params: &RegisterTemplate) -> Result<Template> {
        let by = by.clone();
        let params = params.clone();
        self.run(move |db, _| db.register_template(&by, &params))
            .await
    }

    pub async fn list_templates(&self) -> Result<Templates> {
        let templates = self.run(|db, _| db.list_templates()).await?;
        Ok(Templates(templates))
    }

    pub async fn get_template(&self, params: &Id) -> Result<Template> {
        let template_id = params.id;
        self.run(move |db, _| db.get_template(template_id)).await
    }

    pub async fn register_appointment(
        &self,
        by: &Actor,
        params: &RegisterAppointment,
    ) -> Result<LinkedAppointment> {
        let by = by.clone();
        let params = params.clone();
        self.run(move |db, _| db.register_appointment(&by, &params))
            .await
    }

    pub async fn update_appointment(
        &self,
        by: &Actor,
        params: &UpdateAppointment,
    ) -> Result<LinkedAppointment> {
        let by = by.clone();
        let params = params.clone();
        self.run(move |db, _| db.update_appointment(&by, &params))
            .await
    }

    pub async fn list_appointments(&self, by: &Actor, params: &Id) -> Result<Appointments> {
        let by = by.clone();
        let item_id = params.id;
        let appointments = self
            .run(move |db, _| db.list_appointments(&by, item_id))
            .await?;
        Ok(Appointments(appointments))
    }
}
