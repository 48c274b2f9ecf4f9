// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod health_check;
pub mod helpers;
pub mod notification_api_test;
pub mod report_api_test;
pub mod scan_api_test;
pub mod share_api_test;
