//! Handlers for the robot, device and connection operations.
//!
//! Each handler pulls its identifiers from the request, calls exactly one
//! master operation and serializes the outcome.

use serde::Serialize;
use serde_json::Value;

use super::errors::CommandError;
use super::request::RequestParams;
use crate::master::Master;

const ROBOT_ID: &str = "robotid";
const DEVICE_ID: &str = "deviceid";
const COMMAND_ID: &str = "commandid";
const CONNECTION_ID: &str = "connectionid";

fn to_result<T: Serialize>(value: T) -> Result<Value, CommandError> {
    serde_json::to_value(value).map_err(|error| CommandError::internal(error.to_string()))
}

pub(crate) fn robots(master: &dyn Master, _params: &RequestParams) -> Result<Value, CommandError> {
    to_result(master.list_robots()?)
}

pub(crate) fn robot(master: &dyn Master, params: &RequestParams) -> Result<Value, CommandError> {
    let robot = params.required_id(ROBOT_ID)?;
    to_result(master.get_robot(&robot)?)
}

pub(crate) fn robot_commands(
    master: &dyn Master,
    params: &RequestParams,
) -> Result<Value, CommandError> {
    let robot = params.required_id(ROBOT_ID)?;
    to_result(master.get_robot_commands(&robot)?)
}

pub(crate) fn robot_command(
    master: &dyn Master,
    params: &RequestParams,
) -> Result<Value, CommandError> {
    let robot = params.required_id(ROBOT_ID)?;
    let command = params.required_id(COMMAND_ID)?;
    let args = params.command_params()?;
    Ok(master.execute_robot_command(&robot, &command, &args)?)
}

pub(crate) fn robot_devices(
    master: &dyn Master,
    params: &RequestParams,
) -> Result<Value, CommandError> {
    let robot = params.required_id(ROBOT_ID)?;
    to_result(master.list_robot_devices(&robot)?)
}

pub(crate) fn robot_device(
    master: &dyn Master,
    params: &RequestParams,
) -> Result<Value, CommandError> {
    let robot = params.required_id(ROBOT_ID)?;
    let device = params.required_id(DEVICE_ID)?;
    to_result(master.get_robot_device(&robot, &device)?)
}

pub(crate) fn robot_device_commands(
    master: &dyn Master,
    params: &RequestParams,
) -> Result<Value, CommandError> {
    let robot = params.required_id(ROBOT_ID)?;
    let device = params.required_id(DEVICE_ID)?;
    to_result(master.get_device_commands(&robot, &device)?)
}

pub(crate) fn robot_device_command(
    master: &dyn Master,
    params: &RequestParams,
) -> Result<Value, CommandError> {
    let robot = params.required_id(ROBOT_ID)?;
    let device = params.required_id(DEVICE_ID)?;
    let command = params.required_id(COMMAND_ID)?;
    let args = params.command_params()?;
    Ok(master.execute_device_command(&robot, &device, &command, &args)?)
}

pub(crate) fn robot_connections(
    master: &dyn Master,
    params: &RequestParams,
) -> Result<Value, CommandError> {
    let robot = params.required_id(ROBOT_ID)?;
    to_result(master.list_robot_connections(&robot)?)
}

pub(crate) fn robot_connection(
    master: &dyn Master,
    params: &RequestParams,
) -> Result<Value, CommandError> {
    let robot = params.required_id(ROBOT_ID)?;
    let connection = params.required_id(CONNECTION_ID)?;
    to_result(master.get_robot_connection(&robot, &connection)?)
}
