// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod cat;
pub mod find;
pub mod hosts;
pub mod list;
pub mod shares;
pub mod zip_list;

pub use cat::cat_command;
pub use find::find_command;
pub use hosts::hosts_command;
pub use list::list_command;
pub use shares::shares_command;
pub use zip_list::zip_list_command;
