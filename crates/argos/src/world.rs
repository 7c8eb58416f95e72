//! # World
//!
//! The orchestrator. A `World` owns the registry, the systems, the
//! network role, the physics seam, and the presentation seam, and
//! drives them in a fixed order every tick:
//!
//! 1. Network role
//! 2. Systems, in registration order
//! 3. Per-entity upkeep: facing, then camera follow
//! 4. Physics, when enabled
//! 5. Environment and presentation flush
//!
//! Pausing skips phases 2 through 4. The network role and the
//! environment phase always run, so a paused host keeps answering its
//! session and the frame keeps rendering.
//!
//! The world is also the only implementor of
//! [`NetworkSim`]: network roles spawn pawns, route intent, and read
//! poses exclusively through that seam and never touch the pools.

use std::mem;

use argos_core::{
    ActorComponent, CameraComponent, Command, Component, ComponentHandle, ComponentKind,
    CoreResult, Entity, EntityHandle, EntityId, LocomotionSystem, ModelComponent,
    PhysicsComponent, Registry, SceneComponent, System, SystemManager,
};
use argos_net::{
    ClientLink, ClientRole, DisabledRole, NetworkMode, NetworkRole, NetworkSim, ServerLink,
    ServerRole,
};
use argos_shared::math::{Quaternion, Vec3};
use argos_shared::protocol::{ActorIntent, EntityPose};

use crate::config::WorldConfig;
use crate::environment::Environment;
use crate::input::{InputEvent, KeyBindings};
use crate::physics::{BodyDesc, BuiltinPhysics, Physics};
use crate::presentation::{NullPresentation, Presentation};

/// Where pawns enter the scene: feet on the ground at the origin.
const PAWN_SPAWN: Vec3 = Vec3::new(0.0, 0.9, 0.0);

/// One simulation instance.
pub struct World {
    config: WorldConfig,
    registry: Registry,
    systems: SystemManager,
    role: Box<dyn NetworkRole>,
    physics: Box<dyn Physics>,
    presentation: Box<dyn Presentation>,
    environment: Environment,
    bindings: KeyBindings,
    player: Option<EntityHandle>,
    tick: u32,
    /// Reused live-handle snapshot. Sized once, never grows in steady
    /// state.
    scratch: Vec<EntityHandle>,
}

impl World {
    /// World with the built-in physics engine and no presentation.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self::with_seams(
            config,
            Box::new(BuiltinPhysics::new()),
            Box::new(NullPresentation::new()),
        )
    }

    /// World over caller-supplied physics and presentation seams.
    ///
    /// Opens the configured scene and registers the locomotion system.
    /// The network role starts disabled.
    #[must_use]
    pub fn with_seams(
        config: WorldConfig,
        physics: Box<dyn Physics>,
        mut presentation: Box<dyn Presentation>,
    ) -> Self {
        presentation.create_scene(&config.scene_name);

        let mut systems = SystemManager::new();
        systems.register(Box::new(LocomotionSystem::new()));

        tracing::info!(
            "World created: scene {}, {} entity slots",
            config.scene_name,
            config.entity_capacity
        );

        Self {
            registry: Registry::new(config.entity_capacity, config.component_capacity),
            systems,
            role: Box::new(DisabledRole::new()),
            physics,
            presentation,
            environment: Environment::new(config.sun_speed),
            bindings: KeyBindings::default(),
            player: None,
            tick: 0,
            scratch: Vec::with_capacity(config.entity_capacity),
            config,
        }
    }

    // -------------------------------------------------------------------
    // Entity lifecycle
    // -------------------------------------------------------------------

    /// Spawns an empty entity.
    ///
    /// # Errors
    ///
    /// Returns [`argos_core::CoreError::PoolExhausted`] when every slot
    /// is taken.
    pub fn create_entity(&mut self) -> CoreResult<EntityHandle> {
        self.registry.spawn()
    }

    /// Releases the entity, its components, its physics body, and its
    /// presentation state, and unbinds it from the player slot if it
    /// held it.
    ///
    /// # Errors
    ///
    /// Returns [`argos_core::CoreError::InvalidHandle`] when the handle
    /// is stale.
    pub fn destroy_entity(&mut self, handle: EntityHandle) -> CoreResult<()> {
        let id = self.registry.entity(handle)?.id();

        if let Some(body) = self
            .registry
            .component::<PhysicsComponent>(handle)
            .map(|physics| physics.body)
            .filter(|body| !body.is_null())
        {
            self.physics.remove_body(body);
        }

        self.presentation.remove_entity(id);
        self.systems.forget_all(handle);
        if self.player == Some(handle) {
            self.player = None;
        }
        self.registry.despawn(handle)?;
        tracing::debug!("Entity {} destroyed", id);
        Ok(())
    }

    /// Attaches a component and wires its kind-specific state.
    ///
    /// Attaching a physics component claims a body from the physics
    /// seam, placed and sized from the entity's scene transform. Every
    /// attach re-offers the entity to the systems, so membership
    /// reflects the new mask before the next update.
    ///
    /// # Errors
    ///
    /// Returns [`argos_core::CoreError::PoolExhausted`] when the kind's
    /// pool is full and [`argos_core::CoreError::InvalidHandle`] when
    /// the handle is stale.
    ///
    /// # Panics
    ///
    /// Panics when the entity already has a component of this kind, or
    /// when a physics component is attached before a scene component.
    /// The body takes its starting pose from the scene, so that
    /// ordering is a bug in the caller.
    pub fn attach_component<C: Component>(
        &mut self,
        handle: EntityHandle,
        component: C,
    ) -> CoreResult<ComponentHandle> {
        let attached = self.registry.attach(handle, component)?;
        if C::KIND == ComponentKind::Physics {
            self.create_body_for(handle);
        }
        let mask = self.registry.entity(handle)?.mask();
        self.systems.offer_all(handle, mask);
        Ok(attached)
    }

    /// Detaches a component, returning it.
    ///
    /// Detaching a physics component releases its body. The entity is
    /// re-offered to the systems, so membership reflects the shrunk
    /// mask before the next update.
    ///
    /// # Errors
    ///
    /// Returns [`argos_core::CoreError::InvalidHandle`] when the handle
    /// is stale.
    pub fn detach_component<C: Component>(
        &mut self,
        handle: EntityHandle,
    ) -> CoreResult<Option<C>> {
        if C::KIND == ComponentKind::Physics {
            if let Some(body) = self
                .registry
                .component::<PhysicsComponent>(handle)
                .map(|physics| physics.body)
                .filter(|body| !body.is_null())
            {
                self.physics.remove_body(body);
            }
        }
        let detached = self.registry.detach::<C>(handle)?;
        let mask = self.registry.entity(handle)?.mask();
        self.systems.offer_all(handle, mask);
        Ok(detached)
    }

    /// Claims a body for a freshly attached physics component.
    fn create_body_for(&mut self, handle: EntityHandle) {
        let scene = *self.registry.expect_component::<SceneComponent>(handle);
        let physics = self.registry.expect_component_mut::<PhysicsComponent>(handle);
        let desc = BodyDesc {
            kind: physics.body_kind,
            position: scene.transform.position,
            yaw: 0.0,
            half_extents: physics.half_extents,
        };
        physics.body = self.physics.create_body(desc);
    }

    // -------------------------------------------------------------------
    // Player and input
    // -------------------------------------------------------------------

    /// Binds the entity the local player drives. Its camera becomes the
    /// active view.
    ///
    /// # Panics
    ///
    /// Panics when the entity has no camera component. A player without
    /// a viewpoint is a bug in scene setup.
    pub fn set_player(&mut self, handle: EntityHandle) {
        let view = self.registry.expect_component::<CameraComponent>(handle).view;
        self.presentation.set_view(&view);
        self.player = Some(handle);
    }

    /// Resolves a raw input event to its bound command, if any.
    ///
    /// The world only resolves. The caller applies the command on the
    /// press and reverts it on the release, against the entity it is
    /// driving.
    #[must_use]
    pub fn handle_input(&self, event: InputEvent) -> Option<&'static dyn Command> {
        self.bindings.command_for(event.key())
    }

    /// The input bindings table, for rebinding.
    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    // -------------------------------------------------------------------
    // Systems
    // -------------------------------------------------------------------

    /// Registers a system. Registration order is dispatch order for the
    /// lifetime of the world.
    pub fn add_system(&mut self, system: Box<dyn System>) {
        self.systems.register(system);
    }

    /// Offers every live entity to every system.
    ///
    /// Call once after hand-building a scene so systems settle their
    /// membership before the first update. Attach and detach keep it
    /// current from then on.
    pub fn setup_entities(&mut self) {
        for (handle, entity) in self.registry.pool().iter_alive() {
            self.systems.offer_all(handle, entity.mask());
        }
    }

    // -------------------------------------------------------------------
    // Network
    // -------------------------------------------------------------------

    /// Starts hosting a session and spawns the host's own pawn.
    ///
    /// Returns the pawn's ID, or `None` when the entity pool cannot
    /// seat it. The session stays up either way.
    ///
    /// # Panics
    ///
    /// Panics when a network role is already active. Roles only change
    /// through disabled; call
    /// [`shutdown_network`](Self::shutdown_network) first.
    pub fn init_server(
        &mut self,
        port: u16,
        host_name: &str,
        link: ServerLink,
    ) -> Option<EntityId> {
        assert!(
            !self.role.initialized(),
            "network role already initialized: {}",
            self.role.mode()
        );
        let role = ServerRole::start(
            port,
            host_name,
            self.config.network.max_participants,
            link,
            self,
        );
        let host = role.host_entity();
        self.role = Box::new(role);
        host
    }

    /// Joins a session over an established link.
    ///
    /// The role greets the server on the next update and adopts the
    /// pawn the server assigns in its welcome.
    ///
    /// # Panics
    ///
    /// Panics when a network role is already active. Roles only change
    /// through disabled; call
    /// [`shutdown_network`](Self::shutdown_network) first.
    pub fn init_client(&mut self, name: &str, link: ClientLink) {
        assert!(
            !self.role.initialized(),
            "network role already initialized: {}",
            self.role.mode()
        );
        self.role = Box::new(ClientRole::new(name, link));
    }

    /// Tears the active role down and returns to disabled.
    ///
    /// A server releases every participant pawn; a client says goodbye
    /// and drops its replicas. A world that is already disabled is left
    /// alone.
    pub fn shutdown_network(&mut self) {
        if !self.role.initialized() {
            return;
        }
        let mode = self.role.mode();
        self.run_role(|role, world| role.shutdown(world));
        self.role = Box::new(DisabledRole::new());
        tracing::info!("Network role {} shut down", mode);
    }

    /// Runs `f` with the role detached from the world, so the role can
    /// drive the world through the simulation seam while the world
    /// still owns both.
    fn run_role(&mut self, f: impl FnOnce(&mut dyn NetworkRole, &mut Self)) {
        let mut role = mem::replace(&mut self.role, Box::new(DisabledRole::new()));
        f(role.as_mut(), self);
        self.role = role;
    }

    // -------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------

    /// Advances the world one tick of `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.tick = self.tick.wrapping_add(1);
        self.run_role(|role, world| role.update(world));

        if !self.environment.is_paused() {
            self.systems.update_all(&mut self.registry, dt);

            let live = self.take_live_snapshot();
            for &handle in &live {
                self.update_facing(handle);
                self.update_camera(handle);
            }
            if self.config.physics_enabled {
                self.push_physics_requests(&live);
                self.physics.simulate(dt);
                self.read_physics_poses(&live);
            }
            self.scratch = live;
        }

        self.environment_phase(dt);
    }

    /// Takes the scratch buffer, refilled with every live handle.
    fn take_live_snapshot(&mut self) -> Vec<EntityHandle> {
        let mut live = mem::take(&mut self.scratch);
        live.clear();
        live.extend(self.registry.pool().iter_alive().map(|(handle, _)| handle));
        live
    }

    /// Points the scene transform the way the actor looks. Entities a
    /// physics body drives get their orientation from the body instead.
    fn update_facing(&mut self, handle: EntityHandle) {
        if self.registry.has_kind(handle, ComponentKind::Physics) {
            return;
        }
        let Some(actor) = self.registry.component::<ActorComponent>(handle) else {
            return;
        };
        let yaw = actor.intent.yaw;
        if let Some(scene) = self.registry.component_mut::<SceneComponent>(handle) {
            scene.transform.orientation = Quaternion::from_yaw(yaw);
        }
    }

    /// Parks the camera at its offset above the scene transform.
    fn update_camera(&mut self, handle: EntityHandle) {
        let Some(scene) = self.registry.component::<SceneComponent>(handle) else {
            return;
        };
        let base = scene.transform;
        if let Some(camera) = self.registry.component_mut::<CameraComponent>(handle) {
            camera.view.position = base.position + camera.offset;
            camera.view.orientation = base.orientation;
        }
    }

    /// Hands each body its motion requests for this tick.
    fn push_physics_requests(&mut self, live: &[EntityHandle]) {
        for &handle in live {
            let yaw = self
                .registry
                .component::<ActorComponent>(handle)
                .map(|actor| actor.intent.yaw);
            let Some(physics) = self.registry.component_mut::<PhysicsComponent>(handle) else {
                continue;
            };
            let body = physics.body;
            if body.is_null() {
                continue;
            }
            if let Some(velocity) = physics.velocity_request.take() {
                self.physics.set_velocity(body, velocity);
            }
            if let Some(speed) = physics.jump_request.take() {
                self.physics.jump(body, speed);
            }
            if let Some(yaw) = yaw {
                self.physics.set_yaw(body, yaw);
            }
        }
    }

    /// Copies each body's stepped pose back into its scene transform.
    ///
    /// # Panics
    ///
    /// Panics when a physics entity has no scene component. Attach
    /// ordering makes that unreachable for entities built through the
    /// world.
    fn read_physics_poses(&mut self, live: &[EntityHandle]) {
        for &handle in live {
            let Some(physics) = self.registry.component::<PhysicsComponent>(handle) else {
                continue;
            };
            let Some((position, orientation)) = self.physics.body_pose(physics.body) else {
                continue;
            };
            let scene = self.registry.expect_component_mut::<SceneComponent>(handle);
            scene.transform.position = position;
            scene.transform.orientation = orientation;
        }
    }

    /// Advances the day cycle and flushes the frame to presentation.
    /// Runs paused or not; a paused cycle holds still but keeps
    /// flushing.
    fn environment_phase(&mut self, dt: f32) {
        self.environment.advance(dt);
        self.presentation
            .set_sun_direction(self.environment.sun_direction());

        let live = self.take_live_snapshot();
        for &handle in &live {
            let Ok(entity) = self.registry.entity(handle) else {
                continue;
            };
            let id = entity.id();
            if let Some(scene) = self.registry.component::<SceneComponent>(handle) {
                self.presentation.set_entity_transform(id, &scene.transform);
            }
        }
        self.scratch = live;

        if let Some(player) = self.player {
            if let Some(camera) = self.registry.component::<CameraComponent>(player) {
                self.presentation.set_view(&camera.view);
            }
        }
    }

    // -------------------------------------------------------------------
    // Pause
    // -------------------------------------------------------------------

    /// Freezes the simulation phases. Idempotent.
    pub fn pause(&mut self) {
        if self.environment.is_paused() {
            return;
        }
        self.environment.set_paused(true);
        self.presentation.set_paused(true);
        tracing::info!("World paused at tick {}", self.tick);
    }

    /// Resumes the simulation phases. Idempotent.
    pub fn resume(&mut self) {
        if !self.environment.is_paused() {
            return;
        }
        self.environment.set_paused(false);
        self.presentation.set_paused(false);
        tracing::info!("World resumed at tick {}", self.tick);
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// Settings the world was built with.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The entity and component registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access to the registry, for scene setup.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Entity the local player drives, if bound.
    #[must_use]
    pub const fn player(&self) -> Option<EntityHandle> {
        self.player
    }

    /// Mode of the active network role.
    #[must_use]
    pub fn network_mode(&self) -> NetworkMode {
        self.role.mode()
    }

    /// Whether a server or client role is active.
    #[must_use]
    pub fn network_initialized(&self) -> bool {
        self.role.initialized()
    }

    /// Whether the simulation phases are frozen.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.environment.is_paused()
    }

    /// Ticks advanced since creation.
    #[must_use]
    pub const fn current_tick(&self) -> u32 {
        self.tick
    }

    /// The physics seam, for pose queries.
    #[must_use]
    pub fn physics(&self) -> &dyn Physics {
        self.physics.as_ref()
    }

    // -------------------------------------------------------------------
    // Pawn loadouts
    // -------------------------------------------------------------------

    /// Standard participant loadout. Scene goes on before physics so
    /// the body takes its pose from it; physics is skipped entirely on
    /// worlds that mirror a server.
    fn build_pawn(&mut self, handle: EntityHandle) -> CoreResult<()> {
        let _ = self.attach_component(handle, ActorComponent::default())?;
        let _ = self.attach_component(handle, CameraComponent::default())?;
        let _ = self.attach_component(handle, SceneComponent::at(PAWN_SPAWN))?;
        let _ = self.attach_component(handle, ModelComponent::named("pawn", "default"))?;
        if self.config.physics_enabled {
            let _ = self.attach_component(handle, PhysicsComponent::default())?;
        }
        Ok(())
    }

    /// Mirror loadout: something to place and something to draw.
    fn build_replica(&mut self, handle: EntityHandle) -> CoreResult<()> {
        let _ = self.attach_component(handle, SceneComponent::at(PAWN_SPAWN))?;
        let _ = self.attach_component(handle, ModelComponent::named("pawn", "default"))?;
        Ok(())
    }
}

impl NetworkSim for World {
    fn spawn_participant(&mut self, name: &str) -> Option<EntityId> {
        let handle = match self.registry.spawn() {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!("Could not seat participant {}: {}", name, err);
                return None;
            }
        };
        if let Err(err) = self.build_pawn(handle) {
            tracing::warn!("Could not outfit participant {}: {}", name, err);
            let _ = self.destroy_entity(handle);
            return None;
        }
        if self.player.is_none() {
            self.player = Some(handle);
        }
        self.registry.entity(handle).ok().map(Entity::id)
    }

    fn spawn_replica(&mut self) -> Option<EntityId> {
        let handle = match self.registry.spawn() {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!("Could not seat replica: {}", err);
                return None;
            }
        };
        if let Err(err) = self.build_replica(handle) {
            tracing::warn!("Could not outfit replica: {}", err);
            let _ = self.destroy_entity(handle);
            return None;
        }
        self.registry.entity(handle).ok().map(Entity::id)
    }

    fn despawn(&mut self, id: EntityId) {
        let Some(handle) = self.registry.handle_of(id) else {
            return;
        };
        if let Err(err) = self.destroy_entity(handle) {
            tracing::warn!("Could not release {}: {}", id, err);
        }
    }

    fn apply_intent(&mut self, id: EntityId, intent: ActorIntent) {
        let Some(handle) = self.registry.handle_of(id) else {
            return;
        };
        self.registry
            .expect_component_mut::<ActorComponent>(handle)
            .intent = intent;
    }

    fn apply_pose(&mut self, id: EntityId, pose: &EntityPose) {
        let Some(handle) = self.registry.handle_of(id) else {
            return;
        };
        if let Some(scene) = self.registry.component_mut::<SceneComponent>(handle) {
            scene.transform.position = pose.position;
            scene.transform.orientation = pose.orientation;
        }
    }

    fn pose_of(&self, id: EntityId) -> Option<EntityPose> {
        let handle = self.registry.handle_of(id)?;
        let scene = self.registry.component::<SceneComponent>(handle)?;
        Some(EntityPose::new(
            id.raw(),
            scene.transform.position,
            scene.transform.orientation,
            self.tick,
        ))
    }

    fn visit_poses(&self, visit: &mut dyn FnMut(EntityPose)) {
        for (handle, entity) in self.registry.pool().iter_alive() {
            let Some(scene) = self.registry.component::<SceneComponent>(handle) else {
                continue;
            };
            visit(EntityPose::new(
                entity.id().raw(),
                scene.transform.position,
                scene.transform.orientation,
                self.tick,
            ));
        }
    }

    fn player_id(&self) -> Option<EntityId> {
        let player = self.player?;
        self.registry.entity(player).ok().map(Entity::id)
    }

    fn player_intent(&self) -> Option<ActorIntent> {
        let player = self.player?;
        self.registry
            .component::<ActorComponent>(player)
            .map(|actor| actor.intent)
    }

    fn tick(&self) -> u32 {
        self.tick
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.shutdown_network();
        self.presentation.destroy_scene();
    }
}
