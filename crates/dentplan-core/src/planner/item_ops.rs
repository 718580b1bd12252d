//! Item operations for the Planner.

use super::Planner;
use crate::{
    error::Result,
    models::{
        Actor, AddItemsResult, DeleteItemResult, Item, ReorderResult, StatusUpdateResult,
    },
    params::{AddItems, AssignDoctor, Id, ReorderItems, UpdateItem, UpdateItemStatus},
};

impl Planner {
    /// Changes an item's clinical status and runs the auto-progression
    /// cascade.
    pub async fn update_item_status(
        &self,
        actor: &Actor,
        params: &UpdateItemStatus,
    ) -> Result<StatusUpdateResult> {
        let actor = actor.clone();
        let params = params.clone();
        self.run(move |db, collaborators| db.update_item_status(collaborators, &actor, &params))
            .await
    }

    pub async fn get_item(&self, actor: &Actor, params: &Id) -> Result<Item> {
        let actor = actor.clone();
        let item_id = params.id;
        self.run(move |db, _| db.get_item(&actor, item_id)).await
    }

    pub async fn add_items_to_phase(&self, actor: &Actor, params: &AddItems) -> Result<AddItemsResult> {
        let actor = actor.clone();
        let params = params.clone();
        self.run(move |db, collaborators| db.add_items_to_phase(collaborators, &actor, &params))
            .await
    }

    pub async fn update_item(&self, actor: &Actor, params: &UpdateItem) -> Result<Item> {
        let actor = actor.clone();
        let params = params.clone();
        self.run(move |db, collaborators| db.update_item(collaborators, &actor, &params))
            .await
    }

    pub async fn delete_item(&self, actor: &Actor, params: &Id) -> Result<DeleteItemResult> {
        let actor = actor.clone();
        let item_id = params.id;
        self.run(move |db, collaborators| db.delete_item(collaborators, &actor, item_id))
            .await
    }

    pub async fn reorder_items(&self, actor: &Actor, params: &ReorderItems) -> Result<ReorderResult> {
        let actor = actor.clone();
        let params = params.clone();
        self.run(move |db, collaborators| db.reorder_items(collaborators, &actor, &params))
            .await
    }

    pub async fn assign_doctor(&self, actor: &Actor, params: &AssignDoctor) -> Result<Item> {
        let actor = actor.clone();
        let params = params.clone();
        self.run(move |db, collaborators| db.assign_doctor(collaborators, &actor, &params))
            .await
    }
}
